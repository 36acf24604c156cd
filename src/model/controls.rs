//! User-adjustable rendering controls.

use serde::{Deserialize, Serialize};

use super::ParseEnumError;
use crate::constants::{
    DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST, DEFAULT_OVERLAY_OPACITY, FLOAT_EPSILON, PERCENT_MAX,
    PERCENT_MIN,
};

/// Palettes selectable for the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Gray,
    Hot,
    Cool,
    Jet,
}

impl Colormap {
    /// Palette identifier understood by the render engine.
    pub fn engine_name(&self) -> &'static str {
        match self {
            Colormap::Gray => "gray",
            Colormap::Hot => "hot",
            Colormap::Cool => "cool",
            Colormap::Jet => "jet",
        }
    }

    /// Get the display name for this palette.
    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Gray => "Grayscale",
            Colormap::Hot => "Hot",
            Colormap::Cool => "Cool",
            Colormap::Jet => "Jet",
        }
    }

    pub fn all() -> &'static [Colormap] {
        &[Colormap::Gray, Colormap::Hot, Colormap::Cool, Colormap::Jet]
    }
}

impl std::str::FromStr for Colormap {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" | "grayscale" => Ok(Colormap::Gray),
            "hot" => Ok(Colormap::Hot),
            "cool" => Ok(Colormap::Cool),
            "jet" => Ok(Colormap::Jet),
            _ => Err(ParseEnumError::new("colormap", s)),
        }
    }
}

/// Identifies a single control field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlField {
    Brightness,
    Contrast,
    Colormap,
    OverlayOpacity,
    OverlayVisible,
}

/// A requested change to one control field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlChange {
    Brightness(f32),
    Contrast(f32),
    Colormap(Colormap),
    OverlayOpacity(f32),
    OverlayVisible(bool),
}

impl ControlChange {
    pub fn field(&self) -> ControlField {
        match self {
            ControlChange::Brightness(_) => ControlField::Brightness,
            ControlChange::Contrast(_) => ControlField::Contrast,
            ControlChange::Colormap(_) => ControlField::Colormap,
            ControlChange::OverlayOpacity(_) => ControlField::OverlayOpacity,
            ControlChange::OverlayVisible(_) => ControlField::OverlayVisible,
        }
    }
}

/// Current rendering control values as shown by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlState {
    /// Brightness percentage, 0-100
    pub brightness: f32,
    /// Contrast percentage, 0-100
    pub contrast: f32,
    /// Base image palette
    pub colormap: Colormap,
    /// Overlay opacity, 0.0-1.0
    pub overlay_opacity: f32,
    /// Whether the overlay is composited
    pub overlay_visible: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
            colormap: Colormap::default(),
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            overlay_visible: true,
        }
    }
}

impl ControlState {
    /// Apply a change with range clamping.
    ///
    /// Returns the changed field, or `None` when the clamped value equals the
    /// current one or the value is not a finite number.
    pub fn apply(&mut self, change: ControlChange) -> Option<ControlField> {
        fn changed(old: f32, new: f32) -> bool {
            (old - new).abs() > FLOAT_EPSILON
        }

        match change {
            ControlChange::Brightness(v)
            | ControlChange::Contrast(v)
            | ControlChange::OverlayOpacity(v)
                if !v.is_finite() =>
            {
                log::warn!("Ignoring non-finite value for {:?}", change.field());
                None
            }
            ControlChange::Brightness(v) => {
                let v = v.clamp(PERCENT_MIN, PERCENT_MAX);
                changed(self.brightness, v).then(|| {
                    self.brightness = v;
                    ControlField::Brightness
                })
            }
            ControlChange::Contrast(v) => {
                let v = v.clamp(PERCENT_MIN, PERCENT_MAX);
                changed(self.contrast, v).then(|| {
                    self.contrast = v;
                    ControlField::Contrast
                })
            }
            ControlChange::Colormap(c) => (self.colormap != c).then(|| {
                self.colormap = c;
                ControlField::Colormap
            }),
            ControlChange::OverlayOpacity(v) => {
                let v = v.clamp(0.0, 1.0);
                changed(self.overlay_opacity, v).then(|| {
                    self.overlay_opacity = v;
                    ControlField::OverlayOpacity
                })
            }
            ControlChange::OverlayVisible(b) => (self.overlay_visible != b).then(|| {
                self.overlay_visible = b;
                ControlField::OverlayVisible
            }),
        }
    }

    /// Opacity the overlay volume should actually be drawn with.
    pub fn effective_overlay_opacity(&self) -> f32 {
        if self.overlay_visible {
            self.overlay_opacity
        } else {
            0.0
        }
    }
}
