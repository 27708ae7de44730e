use crate::brush::{BrushKind, MAX_SMOOTHING, StrokeStyle, resolve};
use crate::element::{SceneObject, Stroke, StrokePoint};
use crate::id_generator::generate_id;
use crate::input::{PointerSample, Subscription};
use crate::tool::{Tool, ToolContext, ToolOutcome};

/// State for the freehand tool's current stroke
#[derive(Debug)]
struct StrokeCapture {
    style: StrokeStyle,
    /// Width the pressure multiplier is applied to; fixed for the whole stroke
    nominal_width: f32,
    pressure_sensitive: bool,
    smoothing: f32,
    min_multiplier: f32,
    points: Vec<StrokePoint>,
    _subscription: Subscription,
}

impl StrokeCapture {
    /// Recomputed from the nominal width on every sample, so a pressure dip never
    /// carries over into later samples or strokes.
    fn width_for(&self, pressure: f32) -> f32 {
        if self.pressure_sensitive {
            let pressure = pressure.clamp(0.0, 1.0);
            let multiplier = self.min_multiplier + (1.0 - self.min_multiplier) * pressure;
            self.nominal_width * multiplier
        } else {
            self.nominal_width
        }
    }

    fn add_sample(&mut self, sample: PointerSample) {
        let width = self.width_for(sample.effective_pressure());
        let pos = match self.points.last() {
            Some(last) => last.pos + (sample.pos - last.pos) * (1.0 - self.smoothing),
            None => sample.pos,
        };
        if let Some(last) = self.points.last_mut() {
            if last.pos == pos {
                last.width = width;
                return;
            }
        }
        self.points.push(StrokePoint { pos, width });
    }

    fn to_stroke(&self, id: usize) -> Stroke {
        Stroke::new(id, self.points.clone(), self.style.clone())
    }
}

/// Freehand drawing with one brush kind.
#[derive(Debug)]
pub struct FreehandTool {
    kind: BrushKind,
    capture: Option<StrokeCapture>,
}

impl FreehandTool {
    pub fn new(kind: BrushKind) -> Self {
        Self { kind, capture: None }
    }

    pub fn kind(&self) -> BrushKind {
        self.kind
    }
}

impl Tool for FreehandTool {
    fn name(&self) -> &'static str {
        "Freehand"
    }

    fn on_pointer_down(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) {
        let layer = ctx.document.active_layer();
        if layer.locked {
            log::debug!("Not starting a stroke: layer '{}' is locked", layer.name);
            return;
        }

        let style = resolve(self.kind, ctx.brush.params());
        let mut capture = StrokeCapture {
            nominal_width: style.width,
            style,
            pressure_sensitive: ctx.brush.pressure_sensitive,
            smoothing: ctx.brush.smoothing.clamp(0.0, MAX_SMOOTHING),
            min_multiplier: ctx.config.min_pressure_multiplier,
            points: Vec::new(),
            _subscription: ctx.router.subscribe("freehand"),
        };
        capture.add_sample(sample);
        self.capture = Some(capture);
    }

    fn on_pointer_move(&mut self, sample: PointerSample, _ctx: &ToolContext<'_>) {
        if let Some(capture) = &mut self.capture {
            capture.add_sample(sample);
        }
    }

    fn on_pointer_up(&mut self, sample: PointerSample, _ctx: &ToolContext<'_>) -> ToolOutcome {
        let Some(mut capture) = self.capture.take() else {
            return ToolOutcome::None;
        };
        capture.add_sample(sample);
        let stroke = capture.to_stroke(generate_id());
        log::debug!("Finished {} stroke with {} points", self.kind.id(), stroke.points().len());
        ToolOutcome::Commit(SceneObject::Stroke(stroke))
    }

    fn cancel(&mut self) {
        if self.capture.take().is_some() {
            log::debug!("Discarded in-progress {} stroke", self.kind.id());
        }
    }

    fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn preview(&self) -> Option<SceneObject> {
        self.capture.as_ref().map(|capture| SceneObject::Stroke(capture.to_stroke(0)))
    }
}
