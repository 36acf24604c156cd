//! Interaction tool selection.

use super::ParseEnumError;

/// Mutually exclusive pointer interaction modes on the viewer canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionTool {
    /// Pointer input goes to the render engine's native gestures
    #[default]
    None,
    /// Drag to pan (handled by the render engine)
    Pan,
    /// Drag/scroll to zoom (handled by the render engine)
    Zoom,
    /// Click on the canvas to place an annotation anchor
    PlaceAnnotation,
}

impl InteractionTool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionTool::None => "None",
            InteractionTool::Pan => "Pan",
            InteractionTool::Zoom => "Zoom",
            InteractionTool::PlaceAnnotation => "Add Comment",
        }
    }

    /// Get all selectable tools (excludes `None`).
    pub fn all() -> &'static [InteractionTool] {
        &[
            InteractionTool::Pan,
            InteractionTool::Zoom,
            InteractionTool::PlaceAnnotation,
        ]
    }

    /// Resolve a tool selection against the currently active tool.
    ///
    /// Reselecting the active tool turns it off.
    pub fn toggled(self, selected: InteractionTool) -> InteractionTool {
        if self == selected {
            InteractionTool::None
        } else {
            selected
        }
    }
}

impl std::str::FromStr for InteractionTool {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(InteractionTool::None),
            "pan" | "move" => Ok(InteractionTool::Pan),
            "zoom" => Ok(InteractionTool::Zoom),
            "place-annotation" | "comment" => Ok(InteractionTool::PlaceAnnotation),
            _ => Err(ParseEnumError::new("interaction tool", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_tool_deactivates() {
        let active = InteractionTool::None.toggled(InteractionTool::Pan);
        assert_eq!(active, InteractionTool::Pan);
        assert_eq!(active.toggled(InteractionTool::Pan), InteractionTool::None);
    }

    #[test]
    fn test_toggle_other_tool_switches() {
        let active = InteractionTool::Zoom.toggled(InteractionTool::PlaceAnnotation);
        assert_eq!(active, InteractionTool::PlaceAnnotation);
    }
}
