//! Anatomical viewing planes.

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Viewing plane of the displayed slice, or the combined 3D rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Axial,
    Coronal,
    Sagittal,
    Volumetric,
}

impl View {
    /// Get the display name for this view.
    pub fn name(&self) -> &'static str {
        match self {
            View::Axial => "Axial",
            View::Coronal => "Coronal",
            View::Sagittal => "Sagittal",
            View::Volumetric => "3D Volume",
        }
    }

    /// Get all views.
    pub fn all() -> &'static [View] {
        &[View::Axial, View::Coronal, View::Sagittal, View::Volumetric]
    }

    /// Check if this is one of the 2D anatomical planes.
    pub fn is_planar(&self) -> bool {
        !matches!(self, View::Volumetric)
    }
}

impl std::str::FromStr for View {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "axial" => Ok(View::Axial),
            "coronal" => Ok(View::Coronal),
            "sagittal" => Ok(View::Sagittal),
            "volumetric" | "3d" => Ok(View::Volumetric),
            _ => Err(ParseEnumError::new("view", s)),
        }
    }
}
