use egui::Vec2;

use crate::brush::BrushProfile;
use crate::config::SurfaceConfig;
use crate::document::Document;
use crate::element::SceneObject;
use crate::input::{PointerRouter, PointerSample};

/// Read-only view of the surface a tool works against.
pub struct ToolContext<'a> {
    pub document: &'a Document,
    pub brush: &'a BrushProfile,
    pub config: &'a SurfaceConfig,
    pub router: &'a PointerRouter,
}

/// What a finished gesture asks the surface to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Nothing to apply
    None,
    /// Commit a new object into the active layer
    Commit(SceneObject),
    /// Move an existing object
    Translate { layer: usize, object_id: usize, delta: Vec2 },
}

/// Tool trait defines the pointer interface for all interaction modes.
///
/// Tools never mutate the document themselves: they report a [`ToolOutcome`]
/// and the surface applies it together with its history snapshot.
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Handle pointer press on the canvas.
    fn on_pointer_down(&mut self, sample: PointerSample, ctx: &ToolContext<'_>);

    /// Handle pointer movement while a gesture is in progress.
    fn on_pointer_move(&mut self, sample: PointerSample, ctx: &ToolContext<'_>);

    /// Handle pointer release and report what should be applied.
    fn on_pointer_up(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) -> ToolOutcome;

    /// Drop any in-progress gesture without applying it.
    fn cancel(&mut self);

    /// True while a gesture holds a live pointer subscription.
    fn is_capturing(&self) -> bool;

    /// The uncommitted object a host may draw as feedback.
    fn preview(&self) -> Option<SceneObject> {
        None
    }
}
