//! Annotation (comment marker) data structures.
//!
//! Anchors are stored in canvas pixel coordinates relative to the canvas's
//! on-screen bounding box at the moment of the click that created them. They
//! are not volume-space positions and do not follow canvas resizes.

use serde::{Deserialize, Serialize};

use super::category::AnnotationCategory;
use super::view::View;

/// Unique identifier for an annotation.
///
/// Ids are handed out in increasing order, so comparing two ids tells which
/// annotation arrived first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in canvas-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// On-screen bounding box of the canvas, as reported by the host UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert a pointer position in client (window) coordinates into canvas-local pixels.
    pub fn to_local(&self, client_x: f32, client_y: f32) -> CanvasPoint {
        CanvasPoint::new(client_x - self.left, client_y - self.top)
    }

    /// Check whether a client position falls inside the canvas.
    pub fn contains(&self, client_x: f32, client_y: f32) -> bool {
        client_x >= self.left
            && client_x <= self.left + self.width
            && client_y >= self.top
            && client_y <= self.top + self.height
    }
}

/// Spatial anchor binding an annotation to a canvas position on one slice of one view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Canvas-local click position
    pub position: CanvasPoint,
    /// Slice index displayed when the click happened
    pub slice: u32,
    /// View displayed when the click happened
    pub view: View,
}

impl Anchor {
    pub fn new(position: CanvasPoint, slice: u32, view: View) -> Self {
        Self {
            position,
            slice,
            view,
        }
    }

    /// Check if this anchor sits on the given slice of the given view.
    pub fn is_on(&self, slice: u32, view: View) -> bool {
        self.slice == slice && self.view == view
    }
}

/// Sharing flag carried as metadata. No access control is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    #[default]
    Shared,
}

/// A committed annotation.
///
/// Fields are private so the anchor and timestamp cannot change after
/// creation; editing means creating a new annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    author: String,
    role: String,
    content: String,
    category: AnnotationCategory,
    anchor: Option<Anchor>,
    visibility: Visibility,
    /// Milliseconds since the Unix epoch
    created_at: u64,
}

impl Annotation {
    pub(crate) fn from_draft(id: AnnotationId, draft: NewAnnotation, created_at: u64) -> Self {
        Self {
            id,
            author: draft.author,
            role: draft.role,
            content: draft.content,
            category: draft.category,
            anchor: draft.anchor,
            visibility: draft.visibility,
            created_at,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> AnnotationCategory {
        self.category
    }

    /// The spatial anchor, or `None` for unanchored annotations (never drawn as markers).
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Check if this annotation is anchored on the given slice of the given view.
    pub fn is_on(&self, slice: u32, view: View) -> bool {
        self.anchor.is_some_and(|a| a.is_on(slice, view))
    }
}

/// Input for creating an annotation; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub author: String,
    pub role: String,
    pub content: String,
    pub category: AnnotationCategory,
    pub anchor: Option<Anchor>,
    pub visibility: Visibility,
}

impl NewAnnotation {
    /// Create a shared, unanchored draft.
    pub fn new(
        author: impl Into<String>,
        role: impl Into<String>,
        content: impl Into<String>,
        category: AnnotationCategory,
    ) -> Self {
        Self {
            author: author.into(),
            role: role.into(),
            content: content.into(),
            category,
            anchor: None,
            visibility: Visibility::Shared,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
