use super::{ToolKind, ToolState};
use crate::brush::BrushProfile;
use crate::config::SurfaceConfig;
use crate::document::Document;
use crate::element::SceneObject;
use crate::input::{PointerEvent, PointerRouter};
use crate::tool::{
    FreehandTool, SelectionTool, ShapeTool, Tool, ToolContext, ToolOptions, ToolOutcome,
};

/// Owns the active [`ToolState`] and the router its gestures subscribe through.
#[derive(Debug, Default)]
pub struct ToolMachine {
    state: ToolState,
    router: PointerRouter,
}

impl ToolMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ToolKind {
        self.state.kind()
    }

    /// Replaces the active mode and returns the one it replaced.
    ///
    /// The outgoing tool is cancelled first, so a half-finished stroke or shape is
    /// discarded and its pointer handlers are detached before the new mode exists.
    pub fn transition_to(&mut self, kind: ToolKind, options: ToolOptions) -> ToolKind {
        let old = self.kind();
        self.state.cancel();
        self.state = match kind {
            ToolKind::Idle => ToolState::Idle,
            ToolKind::Drawing(brush) => ToolState::Drawing(FreehandTool::new(brush)),
            ToolKind::ShapePlacement(shape) => {
                ToolState::ShapePlacement(ShapeTool::new(shape, options))
            }
            ToolKind::Selecting => ToolState::Selecting(SelectionTool::new()),
        };
        log::debug!("Tool state {old} -> {kind}");
        old
    }

    /// Feeds one pointer event to the active tool.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        document: &Document,
        brush: &BrushProfile,
        config: &SurfaceConfig,
    ) -> ToolOutcome {
        let sample = *event.sample();
        if !sample.is_valid() {
            log::debug!("Ignoring pointer sample with non-finite position: {sample:?}");
            return ToolOutcome::None;
        }
        let ctx = ToolContext {
            document,
            brush,
            config,
            router: &self.router,
        };
        match event {
            PointerEvent::Down(sample) => {
                // A second press without a release restarts the gesture
                self.state.cancel();
                self.state.on_pointer_down(sample, &ctx);
                ToolOutcome::None
            }
            PointerEvent::Move(sample) => {
                self.state.on_pointer_move(sample, &ctx);
                ToolOutcome::None
            }
            PointerEvent::Up(sample) => self.state.on_pointer_up(sample, &ctx),
        }
    }

    /// Drops any in-progress gesture, keeping the mode.
    pub fn cancel_gesture(&mut self) {
        self.state.cancel();
    }

    pub fn is_capturing(&self) -> bool {
        self.state.is_capturing()
    }

    pub fn preview(&self) -> Option<SceneObject> {
        self.state.preview()
    }

    /// Pointer handlers currently attached by gestures
    pub fn active_subscriptions(&self) -> usize {
        self.router.active_count()
    }
}
