//! Viewer shell: owns the user-facing state of one viewing session.
//!
//! The shell holds annotations, control values, the active tool, the pending
//! annotation anchor and the current slice/view. It forwards engine-relevant
//! changes to its [`RenderBinding`] and reports lifecycle notifications as
//! [`ViewerEvent`]s.
//!
//! Annotations belong to the shell, not to the render session: reloading or
//! closing the scan keeps them.

use crate::binding::{LifecycleState, LoadCompletion, LoadOutcome, LoadRequest, RenderBinding};
use crate::config::{ConfigError, ViewerConfig};
use crate::engine::{EngineFactory, Surface};
use crate::message::{ViewerEvent, ViewerMessage};
use crate::model::{
    Anchor, Annotation, AnnotationCategory, AnnotationId, AnnotationStore, CanvasPoint,
    ControlChange, ControlState, InteractionTool, NewAnnotation, SourceError, SourceInput,
    SourceSlot, View, VolumeSource,
};
use crate::samples;

/// Orchestrates annotations, controls and the render binding.
///
/// Notifications queue up until [`ViewerShell::drain_events`] is called.
/// Hosts drain them once per frame, after dispatching that frame's messages.
pub struct ViewerShell<F: EngineFactory> {
    binding: RenderBinding<F>,
    config: ViewerConfig,

    image: Option<VolumeSource>,
    overlay: Option<VolumeSource>,

    controls: ControlState,
    tool: InteractionTool,
    pending_anchor: Option<Anchor>,
    annotations: AnnotationStore,

    current_slice: u32,
    current_view: View,

    is_loading: bool,
    error: Option<String>,
    events: Vec<ViewerEvent>,
}

impl<F: EngineFactory> ViewerShell<F> {
    /// Create a shell with default configuration.
    pub fn new(factory: F, surface: Surface) -> Self {
        Self::from_valid_config(factory, surface, ViewerConfig::default())
    }

    /// Create a shell from a host-supplied configuration.
    ///
    /// The configuration is validated first; out-of-range control defaults or
    /// slices never reach the engine.
    pub fn with_config(
        factory: F,
        surface: Surface,
        config: ViewerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(factory, surface, config))
    }

    fn from_valid_config(factory: F, surface: Surface, config: ViewerConfig) -> Self {
        let binding = RenderBinding::new(factory, surface)
            .with_overlay_colormap(config.overlay_colormap.clone());
        Self {
            binding,
            image: None,
            overlay: None,
            controls: config.controls,
            tool: InteractionTool::default(),
            pending_anchor: None,
            annotations: AnnotationStore::new(),
            current_slice: config.navigation.default_slice,
            current_view: config.navigation.default_view,
            is_loading: false,
            error: None,
            events: Vec::new(),
            config,
        }
    }

    // ========================================================================
    // Source
    // ========================================================================

    /// Validate the inputs and start loading them.
    ///
    /// Inputs are validated before anything else changes; on error the current
    /// session is left untouched. The returned request must be driven by the
    /// host and its completion passed to [`Self::handle_load_complete`].
    pub fn set_source(
        &mut self,
        image: SourceInput,
        overlay: SourceInput,
    ) -> Result<LoadRequest, SourceError> {
        let image = image
            .resolve(SourceSlot::Image)?
            .ok_or(SourceError::MissingImage)?;
        let overlay = overlay.resolve(SourceSlot::Overlay)?;

        self.error = None;
        self.set_loading(true);
        let request = self
            .binding
            .initialize(&image, overlay.as_ref(), &self.controls);

        self.image = Some(image);
        self.overlay = overlay;
        Ok(request)
    }

    /// Open a bundled sample.
    pub fn load_sample(&mut self, id: &str) -> Result<LoadRequest, SourceError> {
        let sample = samples::find(id).ok_or_else(|| SourceError::UnknownSample {
            id: id.to_string(),
        })?;
        log::debug!("🧪 Opening sample '{}'", sample.title);
        self.set_source(sample.image_input(), sample.overlay_input())
    }

    /// Feed a finished load back into the session.
    pub fn handle_load_complete(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let outcome = self.binding.complete_load(completion, &self.controls);
        match &outcome {
            LoadOutcome::Ready => {
                self.error = None;
                self.set_loading(false);
                self.events.push(ViewerEvent::Ready);
            }
            LoadOutcome::Failed(message) => {
                self.error = Some(message.clone());
                self.set_loading(false);
                self.events.push(ViewerEvent::Error(message.clone()));
            }
            LoadOutcome::Superseded => {}
        }
        outcome
    }

    /// Leave the scan: release the engine and clear sources. Annotations are kept.
    pub fn close(&mut self) {
        log::debug!("🚪 Closing viewer session");
        self.binding.dispose();
        self.image = None;
        self.overlay = None;
        self.pending_anchor = None;
        self.tool = InteractionTool::None;
        self.error = None;
        self.set_loading(false);
    }

    /// Redraw the current scan.
    pub fn force_refresh(&mut self) -> bool {
        self.binding.force_refresh()
    }

    fn set_loading(&mut self, loading: bool) {
        if self.is_loading != loading {
            self.is_loading = loading;
            self.events.push(ViewerEvent::LoadingChanged(loading));
        }
    }

    // ========================================================================
    // Tools and annotations
    // ========================================================================

    /// Toolbar selection: choosing the active tool turns it off.
    ///
    /// Leaving the placement tool discards any pending anchor.
    pub fn select_tool(&mut self, tool: InteractionTool) -> InteractionTool {
        let next = self.tool.toggled(tool);
        if next != InteractionTool::PlaceAnnotation {
            self.pending_anchor = None;
        }
        log::debug!("🔧 Tool: {} -> {}", self.tool.name(), next.name());
        self.tool = next;
        next
    }

    /// Canvas click in canvas-local coordinates.
    ///
    /// Opens the annotation composer at the click when the placement tool is
    /// active and the scan is ready. A later click replaces the pending anchor.
    pub fn handle_canvas_click(&mut self, position: CanvasPoint) -> bool {
        if self.tool != InteractionTool::PlaceAnnotation || !self.is_ready() {
            return false;
        }
        let anchor = Anchor::new(position, self.current_slice, self.current_view);
        log::debug!(
            "📍 Anchor at ({:.0}, {:.0}) on {} slice {}",
            position.x,
            position.y,
            self.current_view.name(),
            self.current_slice
        );
        self.pending_anchor = Some(anchor);
        true
    }

    /// Commit the composer text at the pending anchor.
    ///
    /// Blank content is a no-op and keeps the composer open. On success the
    /// anchor is cleared and the tool returns to none.
    pub fn commit_annotation(
        &mut self,
        content: &str,
        category: AnnotationCategory,
    ) -> Option<AnnotationId> {
        let anchor = self.pending_anchor?;
        let identity = &self.config.identity;
        let draft = NewAnnotation::new(&identity.author, &identity.role, content, category)
            .with_anchor(anchor);

        let id = self.annotations.add(draft)?;
        log::debug!("💬 Annotation {} added ({})", id, category.name());
        self.pending_anchor = None;
        self.tool = InteractionTool::None;
        Some(id)
    }

    /// Add an annotation supplied by the host, anchored or not.
    pub fn add_annotation(&mut self, draft: NewAnnotation) -> Option<AnnotationId> {
        self.annotations.add(draft)
    }

    /// Annotations anchored on the current slice and view, in arrival order.
    pub fn visible_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.on_slice(self.current_slice, self.current_view)
    }

    /// Visible annotations to draw as canvas markers; none until the scan is ready.
    pub fn markers(&self) -> impl Iterator<Item = &Annotation> {
        let ready = self.is_ready();
        self.visible_annotations().filter(move |_| ready)
    }

    // ========================================================================
    // Controls and navigation
    // ========================================================================

    /// Apply a control change and forward it if the value actually changed.
    pub fn update_control(&mut self, change: ControlChange) -> bool {
        match self.controls.apply(change) {
            Some(field) => {
                log::debug!("🎚️  Control {:?} = {:?}", field, change);
                self.binding.apply_control(field, &self.controls);
                true
            }
            None => false,
        }
    }

    /// Restore brightness, contrast, overlay opacity and colormap defaults.
    ///
    /// Overlay visibility and annotations are left as they are.
    pub fn reset_controls(&mut self) {
        let defaults = self.config.controls;
        log::debug!("🔄 Controls reset");
        for change in [
            ControlChange::Brightness(defaults.brightness),
            ControlChange::Contrast(defaults.contrast),
            ControlChange::OverlayOpacity(defaults.overlay_opacity),
            ControlChange::Colormap(defaults.colormap),
        ] {
            self.update_control(change);
        }
    }

    /// Reset controls and return to the default slice.
    pub fn reset_view(&mut self) {
        self.reset_controls();
        self.set_slice(self.config.navigation.default_slice);
    }

    pub fn set_view(&mut self, view: View) -> bool {
        if self.current_view == view {
            return false;
        }
        log::debug!("🧭 View: {}", view.name());
        self.current_view = view;
        true
    }

    /// Move to a slice, clamped to the configured maximum.
    pub fn set_slice(&mut self, slice: u32) -> bool {
        let slice = slice.min(self.config.navigation.max_slice);
        if self.current_slice == slice {
            return false;
        }
        self.current_slice = slice;
        true
    }

    // ========================================================================
    // Message dispatch
    // ========================================================================

    /// Dispatch a UI message. Returns a load request when one was started.
    pub fn update(&mut self, message: ViewerMessage) -> Option<LoadRequest> {
        match message {
            ViewerMessage::SetSource { image, overlay } => {
                let result = self.set_source(image, overlay);
                return self.handle_source_result(result);
            }
            ViewerMessage::LoadSample(id) => {
                let result = self.load_sample(&id);
                return self.handle_source_result(result);
            }
            ViewerMessage::LoadCompleted(completion) => {
                self.handle_load_complete(completion);
            }
            ViewerMessage::Close => self.close(),
            ViewerMessage::SelectTool(tool) => {
                self.select_tool(tool);
            }
            ViewerMessage::CanvasClicked {
                client_x,
                client_y,
                canvas,
            } => {
                self.handle_canvas_click(canvas.to_local(client_x, client_y));
            }
            ViewerMessage::CanvasClickedAt(position) => {
                self.handle_canvas_click(position);
            }
            ViewerMessage::CommitAnnotation { content, category } => {
                self.commit_annotation(&content, category);
            }
            ViewerMessage::UpdateControl(change) => {
                self.update_control(change);
            }
            ViewerMessage::ResetControls => self.reset_controls(),
            ViewerMessage::ResetView => self.reset_view(),
            ViewerMessage::Refresh => {
                self.force_refresh();
            }
            ViewerMessage::SetView(view) => {
                self.set_view(view);
            }
            ViewerMessage::SetSlice(slice) => {
                self.set_slice(slice);
            }
        }
        None
    }

    fn handle_source_result(
        &mut self,
        result: Result<LoadRequest, SourceError>,
    ) -> Option<LoadRequest> {
        match result {
            Ok(request) => Some(request),
            Err(e) => {
                log::warn!("Rejected source: {}", e);
                let message = e.to_string();
                self.error = Some(message.clone());
                self.events.push(ViewerEvent::Error(message));
                None
            }
        }
    }

    /// Take all notifications raised since the last call.
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn tool(&self) -> InteractionTool {
        self.tool
    }

    pub fn pending_anchor(&self) -> Option<&Anchor> {
        self.pending_anchor.as_ref()
    }

    pub fn current_slice(&self) -> u32 {
        self.current_slice
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn image(&self) -> Option<&VolumeSource> {
        self.image.as_ref()
    }

    pub fn overlay(&self) -> Option<&VolumeSource> {
        self.overlay.as_ref()
    }

    /// Whether an overlay was requested for the current scan.
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_ready(&self) -> bool {
        self.binding.is_ready()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.binding.state()
    }

    /// User-facing error of the last failed load or rejected source.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Text for the loading indicator.
    pub fn loading_message(&self) -> &'static str {
        if self.has_overlay() {
            "Loading medical image with overlay..."
        } else {
            "Loading medical image..."
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn binding(&self) -> &RenderBinding<F> {
        &self.binding
    }
}

impl<F: EngineFactory> std::fmt::Debug for ViewerShell<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerShell")
            .field("binding", &self.binding)
            .field("image", &self.image)
            .field("overlay", &self.overlay)
            .field("controls", &self.controls)
            .field("tool", &self.tool)
            .field("pending_anchor", &self.pending_anchor)
            .field("annotations", &self.annotations.len())
            .field("slice", &self.current_slice)
            .field("view", &self.current_view)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::headless::HeadlessFactory;
    use crate::model::{CanvasRect, Colormap};

    fn shell() -> (ViewerShell<HeadlessFactory>, HeadlessFactory) {
        let factory = HeadlessFactory::new();
        (
            ViewerShell::new(factory.clone(), Surface::new("viewer-canvas")),
            factory,
        )
    }

    fn ready_shell() -> (ViewerShell<HeadlessFactory>, HeadlessFactory) {
        let (mut shell, factory) = shell();
        let request = shell
            .set_source(SourceInput::url("/mni152.nii.gz"), SourceInput::none())
            .unwrap();
        shell.handle_load_complete(request.block_on());
        (shell, factory)
    }

    #[test]
    fn test_initial_state() {
        let (shell, _) = shell();
        assert_eq!(shell.tool(), InteractionTool::None);
        assert_eq!(shell.current_slice(), 45);
        assert_eq!(shell.current_view(), View::Axial);
        assert_eq!(*shell.controls(), ControlState::default());
        assert!(!shell.is_loading());
        assert!(shell.annotations().is_empty());
    }

    #[test]
    fn test_missing_image_rejected_without_side_effects() {
        let (mut shell, factory) = shell();
        let result = shell.set_source(SourceInput::none(), SourceInput::url("/seg.nii.gz"));
        assert_eq!(result.unwrap_err(), SourceError::MissingImage);
        assert_eq!(factory.created(), 0);
        assert!(shell.drain_events().is_empty());
    }

    #[test]
    fn test_loading_events() {
        let (mut shell, _) = shell();
        let request = shell
            .set_source(SourceInput::url("/a.nii.gz"), SourceInput::none())
            .unwrap();
        assert!(shell.is_loading());
        shell.handle_load_complete(request.block_on());
        assert_eq!(
            shell.drain_events(),
            vec![
                ViewerEvent::LoadingChanged(true),
                ViewerEvent::LoadingChanged(false),
                ViewerEvent::Ready
            ]
        );
        assert!(shell.drain_events().is_empty());
    }

    #[test]
    fn test_failure_event_and_recovery() {
        let (mut shell, factory) = shell();
        factory.fail_source("/broken.nii.gz");
        let request = shell
            .set_source(SourceInput::url("/broken.nii.gz"), SourceInput::none())
            .unwrap();
        shell.handle_load_complete(request.block_on());
        assert!(shell.error().is_some());
        assert!(!shell.is_loading());
        assert_eq!(shell.lifecycle(), LifecycleState::Failed);

        let request = shell
            .set_source(SourceInput::url("/good.nii.gz"), SourceInput::none())
            .unwrap();
        assert!(shell.error().is_none());
        shell.handle_load_complete(request.block_on());
        assert!(shell.is_ready());
    }

    #[test]
    fn test_tool_toggles_off() {
        let (mut shell, _) = shell();
        assert_eq!(shell.select_tool(InteractionTool::Pan), InteractionTool::Pan);
        assert_eq!(shell.select_tool(InteractionTool::Pan), InteractionTool::None);
        assert_eq!(shell.select_tool(InteractionTool::Zoom), InteractionTool::Zoom);
        assert_eq!(shell.select_tool(InteractionTool::Pan), InteractionTool::Pan);
    }

    #[test]
    fn test_click_requires_placement_tool_and_ready() {
        let (mut shell, _) = shell();
        shell.select_tool(InteractionTool::PlaceAnnotation);
        assert!(!shell.handle_canvas_click(CanvasPoint::new(10.0, 10.0)));

        let (mut shell, _) = ready_shell();
        assert!(!shell.handle_canvas_click(CanvasPoint::new(10.0, 10.0)));
        shell.select_tool(InteractionTool::PlaceAnnotation);
        assert!(shell.handle_canvas_click(CanvasPoint::new(10.0, 10.0)));
    }

    #[test]
    fn test_anchor_captures_click_slice_and_view() {
        let (mut shell, _) = ready_shell();
        shell.set_view(View::Sagittal);
        shell.set_slice(12);
        shell.select_tool(InteractionTool::PlaceAnnotation);
        let canvas = CanvasRect::new(100.0, 50.0, 512.0, 512.0);
        shell.update(ViewerMessage::CanvasClicked {
            client_x: 220.0,
            client_y: 90.0,
            canvas,
        });

        let anchor = shell.pending_anchor().copied().unwrap();
        assert_eq!(anchor.position, CanvasPoint::new(120.0, 40.0));
        assert_eq!(anchor.slice, 12);
        assert_eq!(anchor.view, View::Sagittal);
    }

    #[test]
    fn test_commit_blank_is_noop() {
        let (mut shell, _) = ready_shell();
        shell.select_tool(InteractionTool::PlaceAnnotation);
        shell.handle_canvas_click(CanvasPoint::new(5.0, 5.0));
        assert!(shell.commit_annotation("   ", AnnotationCategory::Note).is_none());
        assert!(shell.annotations().is_empty());
        assert!(shell.pending_anchor().is_some());
        assert_eq!(shell.tool(), InteractionTool::PlaceAnnotation);
    }

    #[test]
    fn test_commit_without_anchor_is_noop() {
        let (mut shell, _) = ready_shell();
        assert!(shell.commit_annotation("Lesion", AnnotationCategory::Finding).is_none());
        assert!(shell.annotations().is_empty());
    }

    #[test]
    fn test_commit_uses_identity_and_resets_tool() {
        let mut config = ViewerConfig::default();
        config.identity.author = "Dr. Sari".to_string();
        config.identity.role = "Radiologist".to_string();
        let factory = HeadlessFactory::new();
        let mut shell = ViewerShell::with_config(factory, Surface::new("c"), config).unwrap();
        let request = shell
            .set_source(SourceInput::url("/a.nii.gz"), SourceInput::none())
            .unwrap();
        shell.handle_load_complete(request.block_on());

        shell.select_tool(InteractionTool::PlaceAnnotation);
        shell.handle_canvas_click(CanvasPoint::new(30.0, 40.0));
        let id = shell
            .commit_annotation("  Hyperintense region  ", AnnotationCategory::Finding)
            .unwrap();

        let annotation = shell.annotations().get(id).unwrap();
        assert_eq!(annotation.author(), "Dr. Sari");
        assert_eq!(annotation.role(), "Radiologist");
        assert_eq!(annotation.content(), "Hyperintense region");
        assert!(shell.pending_anchor().is_none());
        assert_eq!(shell.tool(), InteractionTool::None);
    }

    #[test]
    fn test_leaving_placement_tool_clears_anchor() {
        let (mut shell, _) = ready_shell();
        shell.select_tool(InteractionTool::PlaceAnnotation);
        shell.handle_canvas_click(CanvasPoint::new(5.0, 5.0));
        shell.select_tool(InteractionTool::Pan);
        assert!(shell.pending_anchor().is_none());
    }

    #[test]
    fn test_markers_empty_until_ready() {
        let (mut shell, _) = shell();
        let anchor = Anchor::new(CanvasPoint::new(1.0, 1.0), 45, View::Axial);
        shell.add_annotation(
            NewAnnotation::new("A", "Doctor", "Note", AnnotationCategory::Note).with_anchor(anchor),
        );
        assert_eq!(shell.visible_annotations().count(), 1);
        assert_eq!(shell.markers().count(), 0);

        let request = shell
            .set_source(SourceInput::url("/a.nii.gz"), SourceInput::none())
            .unwrap();
        shell.handle_load_complete(request.block_on());
        assert_eq!(shell.markers().count(), 1);
    }

    #[test]
    fn test_unchanged_control_not_forwarded() {
        let (mut shell, factory) = ready_shell();
        factory.clear_calls();
        assert!(!shell.update_control(ControlChange::Brightness(50.0)));
        assert!(!shell.update_control(ControlChange::Colormap(Colormap::Gray)));
        assert!(factory.calls().is_empty());

        assert!(shell.update_control(ControlChange::Brightness(60.0)));
        assert!(!factory.calls().is_empty());
    }

    #[test]
    fn test_slice_clamped() {
        let (mut shell, _) = shell();
        assert!(shell.set_slice(500));
        assert_eq!(shell.current_slice(), 90);
        assert!(!shell.set_slice(91));
    }

    #[test]
    fn test_reset_view_restores_slice_and_controls() {
        let (mut shell, _) = ready_shell();
        shell.set_slice(10);
        shell.update_control(ControlChange::Contrast(80.0));
        shell.update_control(ControlChange::OverlayVisible(false));
        shell.reset_view();
        assert_eq!(shell.current_slice(), 45);
        assert_eq!(shell.controls().contrast, 50.0);
        assert!(!shell.controls().overlay_visible);
    }

    #[test]
    fn test_close_keeps_annotations() {
        let (mut shell, factory) = ready_shell();
        let note = NewAnnotation::new("A", "Doctor", "Keep me", AnnotationCategory::Note);
        shell.add_annotation(note);
        shell.close();
        assert_eq!(factory.live_instances(), 0);
        assert!(shell.image().is_none());
        assert_eq!(shell.lifecycle(), LifecycleState::Empty);
        assert_eq!(shell.annotations().len(), 1);
    }

    #[test]
    fn test_load_sample() {
        let (mut shell, factory) = shell();
        let request = shell.update(ViewerMessage::LoadSample("hippocampus".to_string()));
        assert!(request.is_some());
        assert!(shell.has_overlay());
        assert_eq!(shell.loading_message(), "Loading medical image with overlay...");
        let (_, volumes) = factory.last_load().unwrap();
        assert_eq!(volumes.len(), 2);

        assert!(shell.update(ViewerMessage::LoadSample("nope".to_string())).is_none());
        assert!(matches!(shell.drain_events().last(), Some(ViewerEvent::Error(_))));
    }
}
