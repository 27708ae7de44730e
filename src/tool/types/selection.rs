use egui::{Pos2, Vec2};

use crate::element::{Element, SceneObject};
use crate::input::{PointerSample, Subscription};
use crate::tool::{Tool, ToolContext, ToolOutcome};

#[derive(Debug)]
struct DragSession {
    layer: usize,
    object_id: usize,
    origin: Pos2,
    current: Pos2,
    preview: Option<SceneObject>,
    _subscription: Subscription,
}

impl DragSession {
    fn delta(&self) -> Vec2 {
        self.current - self.origin
    }
}

/// Picks the topmost object under the pointer and drags it.
///
/// The move is reported once, on release, so the document changes exactly once
/// per drag.
#[derive(Debug, Default)]
pub struct SelectionTool {
    drag: Option<DragSession>,
}

impl SelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer index and object id of the object being dragged
    pub fn selected(&self) -> Option<(usize, usize)> {
        self.drag.as_ref().map(|drag| (drag.layer, drag.object_id))
    }
}

impl Tool for SelectionTool {
    fn name(&self) -> &'static str {
        "Selecting"
    }

    fn on_pointer_down(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) {
        let Some((layer, object_id)) = ctx.document.pick(sample.pos) else {
            log::debug!("Nothing to select at {:?}", sample.pos);
            return;
        };
        let preview = ctx
            .document
            .layer(layer)
            .ok()
            .and_then(|l| l.object(object_id))
            .cloned();
        log::debug!("Selected object #{object_id} on layer {layer}");
        self.drag = Some(DragSession {
            layer,
            object_id,
            origin: sample.pos,
            current: sample.pos,
            preview,
            _subscription: ctx.router.subscribe("selection"),
        });
    }

    fn on_pointer_move(&mut self, sample: PointerSample, _ctx: &ToolContext<'_>) {
        if let Some(drag) = &mut self.drag {
            let step = sample.pos - drag.current;
            drag.current = sample.pos;
            if let Some(preview) = &mut drag.preview {
                preview.translate(step);
            }
        }
    }

    fn on_pointer_up(&mut self, sample: PointerSample, _ctx: &ToolContext<'_>) -> ToolOutcome {
        let Some(mut drag) = self.drag.take() else {
            return ToolOutcome::None;
        };
        drag.current = sample.pos;
        let delta = drag.delta();
        if delta == Vec2::ZERO {
            return ToolOutcome::None;
        }
        ToolOutcome::Translate {
            layer: drag.layer,
            object_id: drag.object_id,
            delta,
        }
    }

    fn cancel(&mut self) {
        self.drag = None;
    }

    fn is_capturing(&self) -> bool {
        self.drag.is_some()
    }

    fn preview(&self) -> Option<SceneObject> {
        self.drag.as_ref().and_then(|drag| drag.preview.clone())
    }
}
