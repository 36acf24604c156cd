//! Data models for the viewer core.

mod annotation;
mod category;
mod controls;
mod source;
mod store;
mod tool;
mod view;

pub use annotation::{
    Anchor, Annotation, AnnotationId, CanvasPoint, CanvasRect, NewAnnotation, Visibility,
};
pub use category::AnnotationCategory;
pub use controls::{Colormap, ControlChange, ControlField, ControlState};
pub use source::{SourceError, SourceInput, SourceSlot, VolumeFile, VolumeSource};
pub use store::AnnotationStore;
pub use tool::InteractionTool;
pub use view::View;

/// Error returned when parsing one of the model enums from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
