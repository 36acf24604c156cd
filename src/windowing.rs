//! Brightness/contrast windowing.
//!
//! Brightness and contrast are not forwarded to the engine as two independent
//! numbers. They are combined into one display window (level + width) derived
//! from the volume's original display range:
//!
//! - contrast scales the window width around the level; every
//!   [`CONTRAST_DOUBLING_SPAN`] points above neutral halves the width
//! - brightness shifts the level; 0 and 100 move it by half the original
//!   range in either direction
//!
//! The window is always recomputed from the original range, never from the
//! previously applied window, so repeated adjustments cannot drift.

use crate::constants::{CONTRAST_DOUBLING_SPAN, DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST};
use crate::engine::DisplayRange;

/// A display window: intensities below `lower_bound` render black, above `upper_bound` white.
///
/// Read-only; build a new window to change it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayWindow {
    level: f32,
    width: f32,
}

impl DisplayWindow {
    /// Build a window. Returns `None` unless both values are finite and `width > 0`.
    pub fn new(level: f32, width: f32) -> Option<Self> {
        if level.is_finite() && width.is_finite() && width > 0.0 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// Window spanning a display range exactly.
    pub fn from_range(range: DisplayRange) -> Option<Self> {
        Self::new((range.min + range.max) / 2.0, range.span())
    }

    /// Derive the window for the given brightness/contrast percentages.
    pub fn from_controls(original: DisplayRange, brightness: f32, contrast: f32) -> Option<Self> {
        let base = Self::from_range(original)?;
        let shift = (brightness - DEFAULT_BRIGHTNESS) / DEFAULT_BRIGHTNESS * (base.width / 2.0);
        let scale = 2f32.powf((DEFAULT_CONTRAST - contrast) / CONTRAST_DOUBLING_SPAN);
        Self::new(base.level - shift, base.width * scale)
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// Window bounds in the engine's range representation.
    pub fn to_range(&self) -> DisplayRange {
        DisplayRange::new(self.lower_bound(), self.upper_bound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_invalid_window() {
        assert!(DisplayWindow::new(0.0, 0.0).is_none());
        assert!(DisplayWindow::new(0.0, -1.0).is_none());
        assert!(DisplayWindow::new(f32::NAN, 10.0).is_none());
        assert!(DisplayWindow::from_range(DisplayRange::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_neutral_controls_keep_original_range() {
        let original = DisplayRange::new(0.0, 1000.0);
        let window = DisplayWindow::from_controls(original, 50.0, 50.0).unwrap();
        assert!(approx_eq(window.lower_bound(), 0.0));
        assert!(approx_eq(window.upper_bound(), 1000.0));
    }

    #[test]
    fn test_contrast_scales_width_around_level() {
        let original = DisplayRange::new(0.0, 1000.0);
        let window = DisplayWindow::from_controls(original, 50.0, 75.0).unwrap();
        assert!(approx_eq(window.level(), 500.0));
        assert!(approx_eq(window.width(), 500.0));

        let window = DisplayWindow::from_controls(original, 50.0, 25.0).unwrap();
        assert!(approx_eq(window.width(), 2000.0));
    }

    #[test]
    fn test_brightness_shifts_level() {
        let original = DisplayRange::new(0.0, 1000.0);
        let brighter = DisplayWindow::from_controls(original, 100.0, 50.0).unwrap();
        assert!(approx_eq(brighter.level(), 0.0));
        assert!(approx_eq(brighter.width(), 1000.0));

        let darker = DisplayWindow::from_controls(original, 0.0, 50.0).unwrap();
        assert!(approx_eq(darker.level(), 1000.0));
    }

    #[test]
    fn test_recompute_does_not_drift() {
        let original = DisplayRange::new(-200.0, 800.0);
        let first = DisplayWindow::from_controls(original, 70.0, 60.0).unwrap();
        for _ in 0..10 {
            DisplayWindow::from_controls(original, 20.0, 90.0).unwrap();
        }
        let again = DisplayWindow::from_controls(original, 70.0, 60.0).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_extreme_contrast_stays_valid() {
        let original = DisplayRange::new(0.0, 1.0);
        let sharp = DisplayWindow::from_controls(original, 50.0, 100.0).unwrap();
        assert!(sharp.width() > 0.0);
        assert!(approx_eq(sharp.width(), 0.25));
    }
}
