//! The drawing surface and its per-host lifecycle.
//!
//! [`DrawingSurface`] composes the layer store, brush profile, tool state
//! machine and snapshot history behind one command surface. Commands never
//! panic or return errors to the host: failures are logged and reported as
//! `false` / `None`.
//!
//! [`SurfaceHost`] owns at most one live surface and hands out
//! [`SurfaceHandle`]s to it, reusing the live surface when the host asks to
//! initialize the same container again.

use std::sync::Arc;

use egui::{Color32, Vec2};
use parking_lot::{Mutex, MutexGuard};

use crate::brush::{BrushKind, BrushProfile};
use crate::command::{Command, Snapshot, SnapshotHistory};
use crate::config::SurfaceConfig;
use crate::document::{Document, SceneState};
use crate::element::{Element, SceneObject};
use crate::error::{ExportError, SurfaceError, SurfaceResult};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::input::{PointerEvent, PointerSample};
use crate::layer::LayerInfo;
use crate::renderer::{self, ExportFormat};
use crate::state::{ToolKind, ToolMachine};
use crate::tool::{ToolAction, ToolOptions, ToolOutcome, ToolSelection};

#[derive(Debug)]
pub struct DrawingSurface {
    container: String,
    config: SurfaceConfig,
    document: Document,
    brush: BrushProfile,
    tools: ToolMachine,
    history: SnapshotHistory,
    events: EventBus,
    initialized: bool,
}

impl DrawingSurface {
    /// Creates a surface with one empty layer and the initial history floor.
    pub fn new(container: &str, size: Vec2, config: SurfaceConfig) -> SurfaceResult<Self> {
        config.check_size(size)?;
        let mut document = Document::new(size, &config.default_layer_name, config.background);
        document.resize(size)?;
        let mut history = SnapshotHistory::new(config.effective_history_limit());
        history.reset(Snapshot::capture(&document.scene_state())?);

        log::info!("Initialized drawing surface for '{container}' at {}x{}", size.x, size.y);
        Ok(Self {
            container: container.to_string(),
            brush: config.brush.clone(),
            config,
            document,
            tools: ToolMachine::new(),
            history,
            events: EventBus::new(),
            initialized: true,
        })
    }

    /// Releases the scene, both history stacks and the active tool.
    /// Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if !self.initialized {
            return;
        }
        self.tools.transition_to(ToolKind::Idle, ToolOptions::default());
        self.document.clear();
        self.history.clear();
        self.initialized = false;
        self.events.emit(EditorEvent::Disposed);
        self.events.clear();
        log::info!("Disposed drawing surface for '{}'", self.container);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn brush(&self) -> &BrushProfile {
        &self.brush
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tools.kind()
    }

    /// Entries on the undo stack, the initial floor included
    pub fn history_depth(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Pointer handlers currently attached by an in-progress gesture
    pub fn active_subscriptions(&self) -> usize {
        self.tools.active_subscriptions()
    }

    /// The uncommitted stroke, shape or dragged object, for host-side feedback.
    pub fn preview(&self) -> Option<SceneObject> {
        self.tools.preview()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    pub fn execute(&mut self, command: Command) -> bool {
        command.apply(self)
    }

    // Tools

    /// Classifies `id` and switches mode, or runs a one-shot action.
    /// Unknown ids are logged and leave everything untouched.
    pub fn select_tool(&mut self, id: &str, options: ToolOptions) -> bool {
        if self.report("select_tool", self.ensure_live()).is_none() {
            return false;
        }
        match ToolSelection::classify(id) {
            ToolSelection::Brush(kind) => {
                self.brush.kind = kind;
                self.switch_tool(ToolKind::Drawing(kind), options);
                true
            }
            ToolSelection::Shape(kind) => {
                self.switch_tool(ToolKind::ShapePlacement(kind), options);
                true
            }
            ToolSelection::Select => {
                self.switch_tool(ToolKind::Selecting, options);
                true
            }
            ToolSelection::Action(ToolAction::Undo) => self.undo(),
            ToolSelection::Action(ToolAction::Redo) => self.redo(),
            ToolSelection::Action(ToolAction::Clear) => self.clear(),
            ToolSelection::Unrecognized(id) => {
                self.report::<()>("select_tool", Err(SurfaceError::UnknownTool(id)));
                false
            }
        }
    }

    fn switch_tool(&mut self, kind: ToolKind, options: ToolOptions) {
        let old = self.tools.transition_to(kind, options);
        if old != kind {
            self.events.emit(EditorEvent::ToolChanged { old, new: kind });
        }
    }

    // Brush

    /// Replaces color, width and opacity in one go. A `kind` also switches the
    /// surface into drawing with that brush.
    pub fn set_brush(
        &mut self,
        color: Color32,
        width: f32,
        opacity: f32,
        kind: Option<BrushKind>,
    ) -> bool {
        if self.report("set_brush", self.ensure_live()).is_none() {
            return false;
        }
        let mut candidate = self.brush.clone();
        if !candidate.set_width(width) {
            return false;
        }
        candidate.set_color(color);
        candidate.set_opacity(opacity);
        self.brush = candidate;
        if let Some(kind) = kind {
            self.brush.kind = kind;
            self.switch_tool(ToolKind::Drawing(kind), ToolOptions::default());
        }
        true
    }

    pub fn set_color(&mut self, color: Color32) -> bool {
        if self.report("set_color", self.ensure_live()).is_none() {
            return false;
        }
        self.brush.set_color(color);
        true
    }

    /// Rejects widths that are not strictly positive.
    pub fn set_width(&mut self, width: f32) -> bool {
        self.report("set_width", self.ensure_live()).is_some() && self.brush.set_width(width)
    }

    /// Returns the stored, clamped opacity.
    pub fn set_brush_opacity(&mut self, opacity: f32) -> Option<f32> {
        self.report("set_brush_opacity", self.ensure_live())?;
        self.brush.set_opacity(opacity);
        Some(self.brush.opacity)
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Option<f32> {
        self.report("set_smoothing", self.ensure_live())?;
        self.brush.set_smoothing(smoothing);
        Some(self.brush.smoothing)
    }

    pub fn set_pressure_sensitivity(&mut self, enabled: bool) -> bool {
        if self.report("set_pressure_sensitivity", self.ensure_live()).is_none() {
            return false;
        }
        self.brush.pressure_sensitive = enabled;
        true
    }

    // Layers

    /// Appends a layer, makes it active and returns its index.
    pub fn add_layer(&mut self) -> Option<usize> {
        let result = self.mutate(|document| Ok(document.add_layer()));
        let index = self.report("add_layer", result)?;
        self.emit_layers();
        Some(index)
    }

    /// Navigation only; not recorded in history.
    pub fn select_layer(&mut self, index: usize) -> bool {
        let result = self.ensure_live().and_then(|()| self.document.select_layer(index));
        if self.report("select_layer", result).is_none() {
            return false;
        }
        self.emit_layers();
        true
    }

    /// Returns the new visibility.
    pub fn toggle_visibility(&mut self, index: usize) -> Option<bool> {
        let result = self.mutate(|document| document.toggle_visibility(index));
        let visible = self.report("toggle_visibility", result)?;
        self.emit_layers();
        Some(visible)
    }

    /// Returns the new lock state.
    pub fn toggle_lock(&mut self, index: usize) -> Option<bool> {
        let result = self.mutate(|document| document.toggle_lock(index));
        let locked = self.report("toggle_lock", result)?;
        self.emit_layers();
        Some(locked)
    }

    /// Refused for the last remaining layer.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        self.tools.cancel_gesture();
        let result = self.mutate(|document| document.remove_layer(index));
        if self.report("remove_layer", result).is_none() {
            return false;
        }
        self.emit_layers();
        true
    }

    /// Returns the stored, clamped opacity.
    pub fn set_layer_opacity(&mut self, index: usize, value: f32) -> Option<f32> {
        let result = self.mutate(|document| document.set_layer_opacity(index, value));
        let opacity = self.report("set_layer_opacity", result)?;
        self.emit_layers();
        Some(opacity)
    }

    pub fn layers(&self) -> Vec<LayerInfo> {
        if !self.initialized {
            return Vec::new();
        }
        self.document.infos()
    }

    // History

    pub fn undo(&mut self) -> bool {
        let result = self.ensure_live().and_then(|()| {
            self.tools.cancel_gesture();
            self.history.undo()
        });
        self.restore("undo", result)
    }

    pub fn redo(&mut self) -> bool {
        let result = self.ensure_live().and_then(|()| {
            self.tools.cancel_gesture();
            self.history.redo()
        });
        self.restore("redo", result)
    }

    fn restore(&mut self, op: &str, result: SurfaceResult<SceneState>) -> bool {
        let Some(state) = self.report(op, result) else {
            return false;
        };
        self.document.restore(state);
        self.emit_history();
        self.emit_layers();
        true
    }

    /// Discards every layer, re-seeds one empty layer and records the result.
    pub fn clear(&mut self) -> bool {
        self.tools.cancel_gesture();
        let result = self.mutate(|document| {
            document.clear();
            Ok(())
        });
        if self.report("clear", result).is_none() {
            return false;
        }
        self.emit_layers();
        true
    }

    // Rendering

    /// Encodes the visible layers. Never touches history.
    pub fn export(&self, format: ExportFormat, scale: f32) -> Option<Vec<u8>> {
        let result = self.ensure_live().and_then(|()| {
            if scale > self.config.max_export_scale {
                return Err(ExportError::InvalidScale(scale).into());
            }
            let limit = self.config.max_export_pixels;
            Ok(renderer::export(&self.document, format, scale, limit)?)
        });
        let bytes = self.report("export", result)?;
        log::debug!("Exported {} bytes as {format:?} at {scale}x", bytes.len());
        Some(bytes)
    }

    /// Export with a host format name ("raster", "png", "jpeg") and an optional
    /// scale, falling back to the configured export scale.
    pub fn export_named(&self, format: &str, scale: Option<f32>) -> Option<Vec<u8>> {
        let format = ExportFormat::parse(format).map_err(SurfaceError::from);
        let format = self.report("export", format)?;
        self.export(format, scale.unwrap_or(self.config.export_scale))
    }

    /// Resizes the render target. Scene objects are kept as they are.
    pub fn resize(&mut self, size: Vec2) -> bool {
        let result = self
            .ensure_live()
            .and_then(|()| self.config.check_size(size))
            .and_then(|()| self.document.resize(size));
        if self.report("resize", result).is_none() {
            return false;
        }
        log::debug!("Resized surface to {}x{}", size.x, size.y);
        self.events.emit(EditorEvent::Resized { size });
        true
    }

    // Pointer input

    pub fn pointer_down(&mut self, sample: PointerSample) -> bool {
        self.handle_pointer(PointerEvent::Down(sample))
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> bool {
        self.handle_pointer(PointerEvent::Move(sample))
    }

    /// Returns true when the finished gesture changed the scene.
    pub fn pointer_up(&mut self, sample: PointerSample) -> bool {
        self.handle_pointer(PointerEvent::Up(sample))
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        if !self.initialized {
            return false;
        }
        let outcome = self.tools.handle(event, &self.document, &self.brush, &self.config);
        match outcome {
            ToolOutcome::None => false,
            ToolOutcome::Commit(object) => {
                let object_id = object.id();
                let result = self.mutate(|document| document.add_to_active(object));
                let Some(layer) = self.report("commit", result) else {
                    return false;
                };
                self.events.emit(EditorEvent::ObjectCommitted { layer, object_id });
                true
            }
            ToolOutcome::Translate { layer, object_id, delta } => {
                let result =
                    self.mutate(|document| document.translate_object(layer, object_id, delta));
                self.report("move", result).is_some()
            }
        }
    }

    // Internals

    fn ensure_live(&self) -> SurfaceResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(SurfaceError::NotInitialized)
        }
    }

    /// Applies a scene mutation and records it as one history entry.
    ///
    /// If the mutation fails, or its snapshot cannot be captured, the scene is
    /// put back as it was and nothing is recorded.
    fn mutate<T>(
        &mut self,
        apply: impl FnOnce(&mut Document) -> SurfaceResult<T>,
    ) -> SurfaceResult<T> {
        self.ensure_live()?;
        let backup = self.document.scene_state();
        let value = match apply(&mut self.document) {
            Ok(value) => value,
            Err(err) => {
                self.document.restore(backup);
                return Err(err);
            }
        };
        match Snapshot::capture(&self.document.scene_state()) {
            Ok(snapshot) => {
                self.history.push(snapshot);
                self.emit_history();
                Ok(value)
            }
            Err(err) => {
                self.document.restore(backup);
                Err(err.into())
            }
        }
    }

    /// Single exit for failures: logs at a level matching the error and drops it.
    fn report<T>(&self, op: &str, result: SurfaceResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err @ SurfaceError::UnknownTool(_)) => {
                log::warn!("{op}: {err}");
                None
            }
            Err(err) if err.is_precondition() => {
                log::debug!("{op} ignored: {err}");
                None
            }
            Err(err) => {
                log::error!("{op} failed: {err}");
                None
            }
        }
    }

    fn emit_history(&self) {
        self.events.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit_layers(&self) {
        self.events.emit(EditorEvent::LayersChanged {
            count: self.document.layers().len(),
            active: self.document.active_index(),
        });
    }
}

/// Shared handle to a live surface.
#[derive(Debug, Clone)]
pub struct SurfaceHandle(Arc<Mutex<DrawingSurface>>);

impl SurfaceHandle {
    fn new(surface: DrawingSurface) -> Self {
        Self(Arc::new(Mutex::new(surface)))
    }

    pub fn lock(&self) -> MutexGuard<'_, DrawingSurface> {
        self.0.lock()
    }

    /// True when both handles point at the same surface.
    pub fn ptr_eq(&self, other: &SurfaceHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_live(&self) -> bool {
        self.0.lock().is_initialized()
    }
}

/// Owns the single live surface of one hosting context.
#[derive(Debug, Default)]
pub struct SurfaceHost {
    config: SurfaceConfig,
    current: Option<SurfaceHandle>,
}

impl SurfaceHost {
    pub fn new(config: SurfaceConfig) -> Self {
        Self { config, current: None }
    }

    /// Returns the live surface when it is already attached to `container`,
    /// otherwise replaces it with a fresh one. Without a container nothing
    /// happens and `None` is returned.
    pub fn initialize(&mut self, container: Option<&str>, size: Vec2) -> Option<SurfaceHandle> {
        let Some(container) = container.map(str::trim).filter(|c| !c.is_empty()) else {
            log::debug!("initialize ignored: no container supplied");
            return None;
        };

        if let Some(handle) = &self.current {
            let surface = handle.lock();
            if surface.is_initialized() && surface.container() == container {
                log::debug!("Reusing live surface for '{container}'");
                drop(surface);
                return Some(handle.clone());
            }
        }

        self.dispose();
        match DrawingSurface::new(container, size, self.config.clone()) {
            Ok(surface) => {
                let handle = SurfaceHandle::new(surface);
                self.current = Some(handle.clone());
                Some(handle)
            }
            Err(err) => {
                log::debug!("initialize ignored: {err}");
                None
            }
        }
    }

    /// Disposes the live surface, if any. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.lock().dispose();
        }
    }

    pub fn current(&self) -> Option<SurfaceHandle> {
        self.current.as_ref().filter(|handle| handle.is_live()).cloned()
    }
}
