//! NeuroView - collaborative medical image viewer core
//!
//! Framework-agnostic state and orchestration for viewing volumetric scans
//! (e.g. NIfTI brain MRI) with an optional segmentation overlay, adjusting
//! display controls, and pinning threaded annotations to a slice of a view.
//!
//! The GPU rendering engine is external: hosts implement
//! [`engine::RenderEngine`] / [`engine::EngineFactory`] on top of it and drive
//! load futures to completion.
//!
//! ```ignore
//! let mut shell = ViewerShell::new(factory, Surface::new("viewer-canvas"));
//! let request = shell.set_source(SourceInput::url("/hippo-ori.nii.gz"), SourceInput::none())?;
//! let completion = request.block_on();
//! shell.handle_load_complete(completion);
//! ```

pub mod binding;
pub mod config;
pub mod constants;
pub mod engine;
pub mod logging;
pub mod message;
pub mod model;
pub mod samples;
pub mod shell;
pub mod windowing;

pub use binding::{
    LifecycleState, LoadCompletion, LoadOutcome, LoadRequest, LoadToken, RenderBinding,
};
pub use config::{ConfigError, LogLevel, ViewerConfig};
pub use engine::{DisplayRange, EngineError, EngineFactory, RenderEngine, Surface, VolumeSpec};
pub use message::{ViewerEvent, ViewerMessage};
pub use shell::ViewerShell;
pub use windowing::DisplayWindow;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
