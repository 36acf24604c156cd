//! Headless render engine.
//!
//! Records every engine call instead of drawing, and tracks how many
//! instances are alive. Used by the test suite and by hosts without a GPU
//! surface (e.g. server-side previews of annotation state).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::{
    DisplayRange, EngineError, EngineFactory, LoadFuture, RenderEngine, Surface, VolumeSpec,
};

/// Identifier of a headless engine instance, in creation order starting at 1.
pub type InstanceId = usize;

/// A recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Attach {
        instance: InstanceId,
        surface: String,
    },
    LoadVolumes {
        instance: InstanceId,
        volumes: Vec<VolumeSpec>,
    },
    SetDisplayRange {
        instance: InstanceId,
        volume: usize,
        range: DisplayRange,
    },
    SetOpacity {
        instance: InstanceId,
        volume: usize,
        opacity: f32,
    },
    SetColormap {
        instance: InstanceId,
        volume: usize,
        name: String,
    },
    Redraw {
        instance: InstanceId,
    },
    Dispose {
        instance: InstanceId,
    },
}

impl EngineCall {
    pub fn instance(&self) -> InstanceId {
        match self {
            EngineCall::Attach { instance, .. }
            | EngineCall::LoadVolumes { instance, .. }
            | EngineCall::SetDisplayRange { instance, .. }
            | EngineCall::SetOpacity { instance, .. }
            | EngineCall::SetColormap { instance, .. }
            | EngineCall::Redraw { instance }
            | EngineCall::Dispose { instance } => *instance,
        }
    }
}

#[derive(Debug)]
struct Shared {
    created: usize,
    live: usize,
    leaked: usize,
    calls: Vec<EngineCall>,
    failing_sources: HashSet<String>,
    fail_create: bool,
    fail_attach: bool,
    fail_dispose: bool,
    display_range: DisplayRange,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            created: 0,
            live: 0,
            leaked: 0,
            calls: Vec::new(),
            failing_sources: HashSet::new(),
            fail_create: false,
            fail_attach: false,
            fail_dispose: false,
            display_range: DisplayRange::new(0.0, 1000.0),
        }
    }
}

/// Factory for [`HeadlessEngine`]s.
///
/// Clones share the same call log and failure configuration, so a test can
/// keep one clone for inspection after handing the other to the viewer.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFactory {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads that include this source label (URL or file name) fail.
    pub fn fail_source(&self, label: impl Into<String>) -> &Self {
        self.shared.borrow_mut().failing_sources.insert(label.into());
        self
    }

    pub fn fail_create(&self, fail: bool) -> &Self {
        self.shared.borrow_mut().fail_create = fail;
        self
    }

    pub fn fail_attach(&self, fail: bool) -> &Self {
        self.shared.borrow_mut().fail_attach = fail;
        self
    }

    /// Make `dispose()` report an error (resources are still released).
    pub fn fail_dispose(&self, fail: bool) -> &Self {
        self.shared.borrow_mut().fail_dispose = fail;
        self
    }

    /// Display range reported for every loaded volume of instances created from now on.
    pub fn set_display_range(&self, range: DisplayRange) -> &Self {
        self.shared.borrow_mut().display_range = range;
        self
    }

    /// Instances created so far.
    pub fn created(&self) -> usize {
        self.shared.borrow().created
    }

    /// Instances created and not yet disposed or dropped.
    pub fn live_instances(&self) -> usize {
        self.shared.borrow().live
    }

    /// Instances dropped without `dispose()`.
    pub fn leaked(&self) -> usize {
        self.shared.borrow().leaked
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.shared.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.borrow_mut().calls.clear();
    }

    /// Volumes passed to the most recent `load_volumes` call.
    pub fn last_load(&self) -> Option<(InstanceId, Vec<VolumeSpec>)> {
        self.shared.borrow().calls.iter().rev().find_map(|c| match c {
            EngineCall::LoadVolumes { instance, volumes } => Some((*instance, volumes.clone())),
            _ => None,
        })
    }
}

impl EngineFactory for HeadlessFactory {
    type Engine = HeadlessEngine;

    fn create(&mut self) -> Result<HeadlessEngine, EngineError> {
        let mut shared = self.shared.borrow_mut();
        if shared.fail_create {
            return Err(EngineError::Construction("no rendering context".to_string()));
        }
        shared.created += 1;
        shared.live += 1;
        let id = shared.created;
        let range = shared.display_range;
        drop(shared);

        log::debug!("Headless engine #{} created", id);
        Ok(HeadlessEngine {
            id,
            shared: Rc::clone(&self.shared),
            volumes: Vec::new(),
            display_range: range,
            disposed: false,
        })
    }
}

#[derive(Debug, Clone)]
struct LoadedVolume {
    opacity: f32,
    colormap: String,
    range: DisplayRange,
}

/// Engine that records calls and keeps just enough volume state to answer queries.
#[derive(Debug)]
pub struct HeadlessEngine {
    id: InstanceId,
    shared: Rc<RefCell<Shared>>,
    volumes: Vec<LoadedVolume>,
    display_range: DisplayRange,
    disposed: bool,
}

impl HeadlessEngine {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Opacity currently applied to a volume.
    pub fn opacity(&self, volume: usize) -> Option<f32> {
        self.volumes.get(volume).map(|v| v.opacity)
    }

    fn record(&self, call: EngineCall) {
        self.shared.borrow_mut().calls.push(call);
    }
}

impl RenderEngine for HeadlessEngine {
    fn attach(&mut self, surface: &Surface) -> Result<(), EngineError> {
        self.record(EngineCall::Attach {
            instance: self.id,
            surface: surface.id.clone(),
        });
        if self.shared.borrow().fail_attach {
            return Err(EngineError::Attach(format!("surface '{}' unavailable", surface.id)));
        }
        Ok(())
    }

    fn load_volumes(&mut self, volumes: Vec<VolumeSpec>) -> LoadFuture {
        self.record(EngineCall::LoadVolumes {
            instance: self.id,
            volumes: volumes.clone(),
        });

        let failing = volumes.iter().find(|v| {
            self.shared
                .borrow()
                .failing_sources
                .contains(v.source.label())
        });
        if let Some(volume) = failing {
            let message = format!("Failed to load volume '{}'", volume.source.label());
            return Box::pin(std::future::ready(Err(EngineError::Load(message))));
        }

        let range = self.display_range;
        self.volumes = volumes
            .into_iter()
            .map(|v| LoadedVolume {
                opacity: v.opacity.unwrap_or(1.0),
                colormap: v.colormap.unwrap_or_else(|| "gray".to_string()),
                range,
            })
            .collect();
        Box::pin(std::future::ready(Ok(())))
    }

    fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    fn display_range(&self, volume: usize) -> Option<DisplayRange> {
        self.volumes.get(volume).map(|v| v.range)
    }

    fn set_display_range(&mut self, volume: usize, range: DisplayRange) {
        self.record(EngineCall::SetDisplayRange {
            instance: self.id,
            volume,
            range,
        });
        if let Some(v) = self.volumes.get_mut(volume) {
            v.range = range;
        }
    }

    fn set_opacity(&mut self, volume: usize, opacity: f32) {
        self.record(EngineCall::SetOpacity {
            instance: self.id,
            volume,
            opacity,
        });
        if let Some(v) = self.volumes.get_mut(volume) {
            v.opacity = opacity;
        }
    }

    fn colormap(&self, volume: usize) -> Option<&str> {
        self.volumes.get(volume).map(|v| v.colormap.as_str())
    }

    fn set_colormap(&mut self, volume: usize, name: &str) {
        self.record(EngineCall::SetColormap {
            instance: self.id,
            volume,
            name: name.to_string(),
        });
        if let Some(v) = self.volumes.get_mut(volume) {
            v.colormap = name.to_string();
        }
    }

    fn redraw(&mut self) {
        self.record(EngineCall::Redraw { instance: self.id });
    }

    fn dispose(&mut self) -> Result<(), EngineError> {
        if self.disposed {
            return Ok(());
        }
        self.record(EngineCall::Dispose { instance: self.id });
        self.disposed = true;
        self.volumes.clear();

        let mut shared = self.shared.borrow_mut();
        shared.live -= 1;
        if shared.fail_dispose {
            return Err(EngineError::Dispose("context already lost".to_string()));
        }
        Ok(())
    }
}

impl Drop for HeadlessEngine {
    fn drop(&mut self) {
        if !self.disposed {
            log::warn!("Headless engine #{} dropped without dispose", self.id);
            let mut shared = self.shared.borrow_mut();
            shared.live -= 1;
            shared.leaked += 1;
        }
    }
}
