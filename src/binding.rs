//! Render binding: owns the render engine instance and keeps it in sync with
//! the viewer's control state.
//!
//! Lifecycle: `Empty -> Loading -> Ready`, or `Loading -> Failed`. A new
//! [`RenderBinding::initialize`] from any state disposes the current engine
//! first, so at most one instance is ever alive. Every load gets a
//! monotonically increasing [`LoadToken`]; completions carrying anything but
//! the latest token are ignored, so a superseded load can never win.
//!
//! Engine errors stop here. They become [`LifecycleState::Failed`] plus a
//! message and are never propagated as panics or unhandled errors.

use std::future::Future;

use crate::constants::{BASE_VOLUME, OVERLAY_COLORMAP, OVERLAY_VOLUME};
use crate::engine::{
    DisplayRange, EngineError, EngineFactory, LoadFuture, RenderEngine, Surface, VolumeSpec,
};
use crate::model::{Colormap, ControlField, ControlState, VolumeSource};
use crate::windowing::DisplayWindow;

/// Lifecycle of the render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed,
}

/// Identifies one load request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

/// An in-flight volume load.
///
/// The host drives it to completion (see [`LoadRequest::run`]) and hands the
/// resulting [`LoadCompletion`] back to the viewer.
pub struct LoadRequest {
    token: LoadToken,
    future: LoadFuture,
}

impl LoadRequest {
    fn failed(token: LoadToken, error: EngineError) -> Self {
        Self {
            token,
            future: Box::pin(std::future::ready(Err(error))),
        }
    }

    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Wait for the engine to finish loading.
    pub fn run(self) -> impl Future<Output = LoadCompletion> {
        let token = self.token;
        let future = self.future;
        async move {
            LoadCompletion {
                token,
                result: future.await,
            }
        }
    }

    /// Drive the load on the current thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn block_on(self) -> LoadCompletion {
        pollster::block_on(self.run())
    }

    /// Drive the load on the browser's microtask queue.
    #[cfg(target_arch = "wasm32")]
    pub fn spawn(self, on_complete: impl FnOnce(LoadCompletion) + 'static) {
        wasm_bindgen_futures::spawn_local(async move {
            on_complete(self.run().await);
        });
    }
}

impl std::fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadRequest")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Result of a finished load, tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    pub token: LoadToken,
    pub result: Result<(), EngineError>,
}

/// What a completion did to the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready,
    Failed(String),
    /// A newer request (or a dispose) replaced this one; nothing changed.
    Superseded,
}

/// Owns exactly one render engine instance at a time.
pub struct RenderBinding<F: EngineFactory> {
    factory: F,
    surface: Surface,
    overlay_colormap: String,
    engine: Option<F::Engine>,
    state: LifecycleState,
    next_token: u64,
    pending: Option<LoadToken>,
    /// Display range of the base volume, captured once per engine instance
    original_range: Option<DisplayRange>,
    has_overlay: bool,
    error: Option<String>,
}

impl<F: EngineFactory> RenderBinding<F> {
    pub fn new(factory: F, surface: Surface) -> Self {
        Self {
            factory,
            surface,
            overlay_colormap: OVERLAY_COLORMAP.to_string(),
            engine: None,
            state: LifecycleState::Empty,
            next_token: 0,
            pending: None,
            original_range: None,
            has_overlay: false,
            error: None,
        }
    }

    /// Use a different palette for overlay volumes.
    pub fn with_overlay_colormap(mut self, name: impl Into<String>) -> Self {
        self.overlay_colormap = name.into();
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    /// Message of the last failed load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The live engine instance, if any.
    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    /// Whether the loaded session includes an overlay volume.
    pub fn has_overlay(&self) -> bool {
        self.has_overlay
    }

    /// Base volume range the windowing transform is derived from.
    pub fn original_range(&self) -> Option<DisplayRange> {
        self.original_range
    }

    /// Dispose any existing engine, construct a new one and start loading.
    ///
    /// Safe to call while a previous load is still in flight; that load is
    /// superseded.
    pub fn initialize(
        &mut self,
        image: &VolumeSource,
        overlay: Option<&VolumeSource>,
        controls: &ControlState,
    ) -> LoadRequest {
        self.release_engine();

        self.next_token += 1;
        let token = LoadToken(self.next_token);
        self.pending = Some(token);
        self.state = LifecycleState::Loading;
        self.error = None;
        self.original_range = None;
        self.has_overlay = overlay.is_some();

        log::info!(
            "📂 Loading '{}'{} (request {})",
            image.label(),
            overlay
                .map(|o| format!(" with overlay '{}'", o.label()))
                .unwrap_or_default(),
            token.0
        );

        let mut engine = match self.factory.create() {
            Ok(engine) => engine,
            Err(e) => return LoadRequest::failed(token, e),
        };

        if let Err(e) = engine.attach(&self.surface) {
            dispose_engine(&mut engine);
            return LoadRequest::failed(token, e);
        }

        let volumes = self.load_list(image, overlay, controls);
        let future = engine.load_volumes(volumes);
        self.engine = Some(engine);

        LoadRequest { token, future }
    }

    /// Ordered load list: base image first, then the overlay pre-configured
    /// with its current opacity and the overlay palette.
    fn load_list(
        &self,
        image: &VolumeSource,
        overlay: Option<&VolumeSource>,
        controls: &ControlState,
    ) -> Vec<VolumeSpec> {
        let mut volumes = vec![VolumeSpec::new(image.clone())];
        if let Some(overlay) = overlay {
            volumes.push(
                VolumeSpec::new(overlay.clone())
                    .with_opacity(controls.effective_overlay_opacity())
                    .with_colormap(self.overlay_colormap.clone()),
            );
        }
        volumes
    }

    /// Apply a load completion.
    ///
    /// On success the full control state is pushed to the engine once;
    /// control changes made while loading are not buffered individually.
    pub fn complete_load(
        &mut self,
        completion: LoadCompletion,
        controls: &ControlState,
    ) -> LoadOutcome {
        if self.pending != Some(completion.token) {
            log::debug!("Ignoring superseded load {:?}", completion.token);
            return LoadOutcome::Superseded;
        }
        self.pending = None;

        let result = match (completion.result, self.engine.as_mut()) {
            (Ok(()), Some(engine)) => Ok(engine),
            (Ok(()), None) => {
                Err("Render engine was released before loading finished".to_string())
            }
            (Err(e), _) => Err(e.to_string()),
        };

        match result {
            Ok(engine) => {
                self.original_range = engine.display_range(BASE_VOLUME);
                self.has_overlay = self.has_overlay && engine.volume_count() > OVERLAY_VOLUME;
                self.state = LifecycleState::Ready;
                log::info!(
                    "✅ Volumes ready (overlay: {}, range: {:?})",
                    self.has_overlay,
                    self.original_range
                );
                self.sync_all(controls);
                LoadOutcome::Ready
            }
            Err(message) => {
                log::error!("❌ Load failed: {}", message);
                self.release_engine();
                self.state = LifecycleState::Failed;
                self.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Push one changed control field to the engine.
    ///
    /// Returns whether any engine call was made. No-op unless `Ready`, and
    /// for overlay fields when no overlay is loaded.
    pub fn apply_control(&mut self, field: ControlField, controls: &ControlState) -> bool {
        if self.state != LifecycleState::Ready {
            log::debug!("Control {:?} not applied: engine not ready", field);
            return false;
        }
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };

        let applied = match field {
            ControlField::Brightness | ControlField::Contrast => {
                apply_window(engine, self.original_range, controls)
            }
            ControlField::Colormap => apply_colormap(engine, controls.colormap),
            ControlField::OverlayOpacity => {
                // Hidden overlays keep opacity 0 until shown again
                self.has_overlay
                    && controls.overlay_visible
                    && apply_overlay_opacity(engine, controls.overlay_opacity)
            }
            ControlField::OverlayVisible => {
                self.has_overlay
                    && apply_overlay_opacity(engine, controls.effective_overlay_opacity())
            }
        };

        if applied {
            engine.redraw();
        }
        applied
    }

    /// Re-derive the whole engine configuration from the control state.
    fn sync_all(&mut self, controls: &ControlState) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        apply_window(engine, self.original_range, controls);
        apply_colormap(engine, controls.colormap);
        if self.has_overlay {
            apply_overlay_opacity(engine, controls.effective_overlay_opacity());
        }
        engine.redraw();
    }

    /// Redraw the current engine without changing any state.
    pub fn force_refresh(&mut self) -> bool {
        match (self.state, self.engine.as_mut()) {
            (LifecycleState::Ready, Some(engine)) => {
                engine.redraw();
                true
            }
            _ => false,
        }
    }

    /// Release the engine and return to `Empty`. Idempotent.
    ///
    /// Any load still in flight is superseded.
    pub fn dispose(&mut self) {
        self.release_engine();
        self.pending = None;
        self.original_range = None;
        self.has_overlay = false;
        self.error = None;
        self.state = LifecycleState::Empty;
    }

    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            dispose_engine(&mut engine);
        }
    }
}

impl<F: EngineFactory> Drop for RenderBinding<F> {
    fn drop(&mut self) {
        self.release_engine();
    }
}

impl<F: EngineFactory> std::fmt::Debug for RenderBinding<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBinding")
            .field("surface", &self.surface)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("engine_alive", &self.engine.is_some())
            .field("has_overlay", &self.has_overlay)
            .field("error", &self.error)
            .finish()
    }
}

/// Best-effort disposal; errors are logged, never propagated.
fn dispose_engine<E: RenderEngine>(engine: &mut E) {
    if let Err(e) = engine.dispose() {
        log::warn!("Engine cleanup error: {}", e);
    }
}

fn apply_window<E: RenderEngine>(
    engine: &mut E,
    original: Option<DisplayRange>,
    controls: &ControlState,
) -> bool {
    let window = original.and_then(|range| {
        DisplayWindow::from_controls(range, controls.brightness, controls.contrast)
    });
    match window {
        Some(window) => {
            log::debug!(
                "☀️  Window level={:.1} width={:.1} (brightness={:.0}, contrast={:.0})",
                window.level(),
                window.width(),
                controls.brightness,
                controls.contrast
            );
            engine.set_display_range(BASE_VOLUME, window.to_range());
            true
        }
        None => {
            log::debug!("No usable display range; windowing skipped");
            false
        }
    }
}

fn apply_colormap<E: RenderEngine>(engine: &mut E, colormap: Colormap) -> bool {
    let name = colormap.engine_name();
    if engine.colormap(BASE_VOLUME) == Some(name) {
        return false;
    }
    log::debug!("🎨 Colormap: {}", name);
    engine.set_colormap(BASE_VOLUME, name);
    true
}

fn apply_overlay_opacity<E: RenderEngine>(engine: &mut E, opacity: f32) -> bool {
    if engine.volume_count() <= OVERLAY_VOLUME {
        return false;
    }
    log::debug!("Overlay opacity: {:.2}", opacity);
    engine.set_opacity(OVERLAY_VOLUME, opacity);
    true
}
