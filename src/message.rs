//! Viewer message types.
//!
//! UI actions come in as [`ViewerMessage`]s and are dispatched by
//! [`ViewerShell::update`](crate::ViewerShell::update). Notifications for the
//! host go out as [`ViewerEvent`]s.

use crate::binding::LoadCompletion;
use crate::model::{
    AnnotationCategory, CanvasPoint, CanvasRect, ControlChange, InteractionTool, SourceInput, View,
};

/// Messages that can be sent to update viewer state.
#[derive(Debug, Clone)]
pub enum ViewerMessage {
    // Source
    /// Open a scan from URL or file inputs
    SetSource {
        image: SourceInput,
        overlay: SourceInput,
    },
    /// Open a bundled sample by id
    LoadSample(String),
    /// A load request finished
    LoadCompleted(LoadCompletion),
    /// Back to the gallery: release the engine and clear sources
    Close,

    // Tools
    /// Toolbar button pressed
    SelectTool(InteractionTool),

    // Canvas
    /// Click in host client coordinates
    CanvasClicked {
        client_x: f32,
        client_y: f32,
        canvas: CanvasRect,
    },
    /// Click already in canvas-local coordinates
    CanvasClickedAt(CanvasPoint),

    // Annotation composer
    /// Submit the composer for the pending anchor
    CommitAnnotation {
        content: String,
        category: AnnotationCategory,
    },

    // Controls
    /// Slider, select or toggle changed
    UpdateControl(ControlChange),
    /// Restore control defaults
    ResetControls,
    /// Restore control defaults and slice
    ResetView,
    /// Force a redraw of the current engine
    Refresh,

    // Navigation
    SetView(View),
    SetSlice(u32),
}

/// Notifications for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Loading indicator should be shown or hidden
    LoadingChanged(bool),
    /// The current scan finished loading
    Ready,
    /// A user-facing error message
    Error(String),
}
