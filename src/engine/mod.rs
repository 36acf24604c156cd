//! Render engine boundary.
//!
//! The volumetric rendering engine (GPU drawing, medical image decoding) is an
//! external collaborator. The viewer only talks to it through [`RenderEngine`],
//! and obtains fresh instances through an [`EngineFactory`], so the binding can
//! be driven by [`headless::HeadlessEngine`] in tests.

pub mod headless;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::model::VolumeSource;

/// Future returned by [`RenderEngine::load_volumes`].
///
/// Single-threaded: not `Send`, driven on the UI thread.
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<(), EngineError>>>>;

/// Errors reported by a render engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Engine instance could not be created
    #[error("Failed to create render engine: {0}")]
    Construction(String),

    /// Engine could not bind to the display surface
    #[error("Failed to attach to display surface: {0}")]
    Attach(String),

    /// A volume failed to fetch or decode
    #[error("{0}")]
    Load(String),

    /// Releasing engine resources failed
    #[error("Failed to dispose render engine: {0}")]
    Dispose(String),
}

/// Intensity range reported by (or pushed to) the engine for one volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub min: f32,
    pub max: f32,
}

impl DisplayRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Display surface the engine draws into (a canvas element on the web).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    /// Host identifier of the surface, e.g. a canvas element id
    pub id: String,
}

impl Surface {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One entry of the ordered load list.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSpec {
    pub source: VolumeSource,
    /// Initial opacity; engine default when `None`
    pub opacity: Option<f32>,
    /// Initial palette; engine default when `None`
    pub colormap: Option<String>,
}

impl VolumeSpec {
    pub fn new(source: VolumeSource) -> Self {
        Self {
            source,
            opacity: None,
            colormap: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = Some(colormap.into());
        self
    }
}

/// Capabilities the viewer needs from a volumetric rendering engine.
///
/// Volume indices follow the order of the last load list. Setters must
/// tolerate indices that do not exist.
pub trait RenderEngine {
    /// Bind the engine to a display surface.
    fn attach(&mut self, surface: &Surface) -> Result<(), EngineError>;

    /// Start loading an ordered list of volumes. Completion is never assumed to be synchronous.
    fn load_volumes(&mut self, volumes: Vec<VolumeSpec>) -> LoadFuture;

    /// Number of volumes currently loaded.
    fn volume_count(&self) -> usize;

    /// Display range of a loaded volume.
    fn display_range(&self, volume: usize) -> Option<DisplayRange>;

    /// Replace the display range (window) of a volume.
    fn set_display_range(&mut self, volume: usize, range: DisplayRange);

    fn set_opacity(&mut self, volume: usize, opacity: f32);

    /// Palette currently applied to a volume.
    fn colormap(&self, volume: usize) -> Option<&str>;

    fn set_colormap(&mut self, volume: usize, name: &str);

    /// Push pending volume changes to the display.
    fn redraw(&mut self);

    /// Release all GPU and surface resources held by this instance.
    fn dispose(&mut self) -> Result<(), EngineError>;
}

/// Creates fresh engine instances; one per load.
pub trait EngineFactory {
    type Engine: RenderEngine;

    fn create(&mut self) -> Result<Self::Engine, EngineError>;
}
