use egui::Pos2;

use crate::element::{Element, SceneObject, Shape, ShapeGeometry, ShapeKind, ShapeStyle};
use crate::id_generator::generate_id;
use crate::input::{PointerSample, Subscription};
use crate::tool::{Tool, ToolContext, ToolOptions, ToolOutcome};

/// Below this span in both directions a placement counts as a stray click.
const MIN_SHAPE_SPAN: f32 = 1e-3;

/// One anchor-to-pointer drag. Owns the move/up handlers for its lifetime.
#[derive(Debug)]
struct PlacementSession {
    anchor: Pos2,
    placeholder: Shape,
    subscription: Subscription,
}

impl PlacementSession {
    fn track(&mut self, kind: ShapeKind, pointer: Pos2) {
        self.placeholder.set_geometry(ShapeGeometry::span(kind, self.anchor, pointer));
    }

    /// Consumes the session; its handlers are detached on the way out.
    fn finish(self) -> Shape {
        self.subscription.dispose();
        self.placeholder
    }
}

/// Places one parametric shape per drag.
#[derive(Debug)]
pub struct ShapeTool {
    kind: ShapeKind,
    options: ToolOptions,
    placement: Option<PlacementSession>,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind, options: ToolOptions) -> Self {
        Self {
            kind,
            options,
            placement: None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        "ShapePlacement"
    }

    fn on_pointer_down(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) {
        let layer = ctx.document.active_layer();
        if layer.locked {
            log::debug!("Not placing a {}: layer '{}' is locked", self.kind.id(), layer.name);
            return;
        }

        let style = ShapeStyle {
            stroke: ctx.brush.color,
            width: self
                .options
                .stroke_width
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(ctx.brush.width),
            fill: self.options.fill,
        };
        // Zero-size placeholder until the first move
        let geometry = ShapeGeometry::span(self.kind, sample.pos, sample.pos);
        self.placement = Some(PlacementSession {
            anchor: sample.pos,
            placeholder: Shape::new(generate_id(), self.kind, geometry, style, ctx.brush.opacity),
            subscription: ctx.router.subscribe("shape"),
        });
    }

    fn on_pointer_move(&mut self, sample: PointerSample, _ctx: &ToolContext<'_>) {
        let kind = self.kind;
        if let Some(placement) = self.placement.as_mut().filter(|p| p.subscription.is_live()) {
            placement.track(kind, sample.pos);
        }
    }

    fn on_pointer_up(&mut self, sample: PointerSample, _ctx: &ToolContext<'_>) -> ToolOutcome {
        let Some(mut placement) = self.placement.take() else {
            return ToolOutcome::None;
        };
        placement.track(self.kind, sample.pos);
        let shape = placement.finish();

        let bounds = shape.geometry().bounds();
        if bounds.width() < MIN_SHAPE_SPAN && bounds.height() < MIN_SHAPE_SPAN {
            log::debug!("Dropped zero-size {}", self.kind.id());
            return ToolOutcome::None;
        }
        log::debug!("Placed {} #{} spanning {:?}", self.kind.id(), shape.id(), bounds);
        ToolOutcome::Commit(SceneObject::Shape(shape))
    }

    fn cancel(&mut self) {
        if let Some(placement) = self.placement.take() {
            log::debug!("Cancelled {} placement", self.kind.id());
            drop(placement.finish());
        }
    }

    fn is_capturing(&self) -> bool {
        self.placement.is_some()
    }

    fn preview(&self) -> Option<SceneObject> {
        self.placement
            .as_ref()
            .map(|placement| SceneObject::Shape(placement.placeholder.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushProfile;
    use crate::config::SurfaceConfig;
    use crate::document::Document;
    use crate::input::PointerRouter;
    use egui::{Color32, Vec2, pos2};

    fn run(tool: &mut ShapeTool, router: &PointerRouter, from: Pos2, to: Pos2) -> ToolOutcome {
        let document = Document::new(Vec2::new(200.0, 200.0), "Layer", None);
        let brush = BrushProfile::default();
        let config = SurfaceConfig::default();
        let ctx = ToolContext {
            document: &document,
            brush: &brush,
            config: &config,
            router,
        };
        tool.on_pointer_down(PointerSample::new(from), &ctx);
        assert_eq!(router.active_count(), 1);
        tool.on_pointer_move(PointerSample::new(to), &ctx);
        tool.on_pointer_up(PointerSample::new(to), &ctx)
    }

    #[test]
    fn rectangle_placement_commits_and_detaches() {
        let router = PointerRouter::new();
        let mut tool = ShapeTool::new(ShapeKind::Rectangle, ToolOptions::default());
        let outcome = run(&mut tool, &router, pos2(10.0, 10.0), pos2(110.0, 60.0));
        let ToolOutcome::Commit(SceneObject::Shape(shape)) = outcome else {
            panic!("expected a shape");
        };
        assert!((shape.width() - 100.0).abs() < 1e-3);
        assert!((shape.height() - 50.0).abs() < 1e-3);
        assert_eq!(router.active_count(), 0);
        assert!(!tool.is_capturing());
    }

    #[test]
    fn options_override_style() {
        let router = PointerRouter::new();
        let options = ToolOptions {
            fill: Some(Color32::YELLOW),
            stroke_width: Some(7.0),
        };
        let mut tool = ShapeTool::new(ShapeKind::Circle, options);
        let outcome = run(&mut tool, &router, pos2(0.0, 0.0), pos2(40.0, 20.0));
        let ToolOutcome::Commit(SceneObject::Shape(shape)) = outcome else {
            panic!("expected a shape");
        };
        assert_eq!(shape.style().fill, Some(Color32::YELLOW));
        assert_eq!(shape.style().width, 7.0);
    }

    #[test]
    fn click_without_drag_places_nothing() {
        let router = PointerRouter::new();
        let mut tool = ShapeTool::new(ShapeKind::Triangle, ToolOptions::default());
        assert_eq!(run(&mut tool, &router, pos2(5.0, 5.0), pos2(5.0, 5.0)), ToolOutcome::None);
        assert_eq!(router.active_count(), 0);
    }

    #[test]
    fn cancel_discards_placeholder_and_detaches() {
        let document = Document::new(Vec2::new(200.0, 200.0), "Layer", None);
        let brush = BrushProfile::default();
        let config = SurfaceConfig::default();
        let router = PointerRouter::new();
        let ctx = ToolContext {
            document: &document,
            brush: &brush,
            config: &config,
            router: &router,
        };

        let mut tool = ShapeTool::new(ShapeKind::Triangle, ToolOptions::default());
        tool.on_pointer_down(PointerSample::new(pos2(10.0, 10.0)), &ctx);
        tool.on_pointer_move(PointerSample::new(pos2(50.0, 50.0)), &ctx);
        assert!(tool.preview().is_some());

        tool.cancel();
        assert!(!tool.is_capturing());
        assert!(tool.preview().is_none());
        assert_eq!(router.active_count(), 0);
        let outcome = tool.on_pointer_up(PointerSample::new(pos2(50.0, 50.0)), &ctx);
        assert_eq!(outcome, ToolOutcome::None);
    }
}
