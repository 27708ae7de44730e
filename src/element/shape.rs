use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::Element;
use crate::element::common::{self, HIT_TOLERANCE};
use crate::brush::Composite;
use crate::renderer::{self, Canvas};

/// Segments used to approximate an ellipse outline.
const ELLIPSE_SEGMENTS: usize = 48;
/// Sides of the polygon tool.
pub const POLYGON_SIDES: usize = 6;
/// Length of each arrow-head barb relative to the stroke width.
const ARROW_HEAD_FACTOR: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Polygon,
    Line,
    Arrow,
}

impl ShapeKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "rectangle" | "rect" | "square" => Some(Self::Rectangle),
            "circle" | "ellipse" => Some(Self::Circle),
            "triangle" => Some(Self::Triangle),
            "polygon" => Some(Self::Polygon),
            "line" => Some(Self::Line),
            "arrow" => Some(Self::Arrow),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Polygon => "polygon",
            Self::Line => "line",
            Self::Arrow => "arrow",
        }
    }

    /// Lines and arrows have no interior to fill.
    pub fn is_closed(&self) -> bool {
        !matches!(self, Self::Line | Self::Arrow)
    }
}

/// Resolved geometry of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Rect { min: Pos2, size: Vec2 },
    Ellipse { center: Pos2, radii: Vec2 },
    Triangle { min: Pos2, size: Vec2 },
    Polygon { min: Pos2, size: Vec2 },
    Line { start: Pos2, end: Pos2, arrow: bool },
}

impl ShapeGeometry {
    /// Geometry spanned by dragging from `anchor` to `current`.
    pub fn span(kind: ShapeKind, anchor: Pos2, current: Pos2) -> Self {
        let delta = current - anchor;
        let min = Pos2::new(anchor.x.min(current.x), anchor.y.min(current.y));
        let size = Vec2::new(delta.x.abs(), delta.y.abs());
        match kind {
            ShapeKind::Rectangle => Self::Rect { min, size },
            ShapeKind::Circle => Self::Ellipse {
                center: min + size / 2.0,
                radii: size / 2.0,
            },
            ShapeKind::Triangle => Self::Triangle { min, size },
            ShapeKind::Polygon => Self::Polygon { min, size },
            ShapeKind::Line => Self::Line { start: anchor, end: current, arrow: false },
            ShapeKind::Arrow => Self::Line { start: anchor, end: current, arrow: true },
        }
    }

    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rect { min, size }
            | Self::Triangle { min, size }
            | Self::Polygon { min, size } => Rect::from_min_size(min, size),
            Self::Ellipse { center, radii } => Rect::from_center_size(center, radii * 2.0),
            Self::Line { start, end, .. } => Rect::from_two_pos(start, end),
        }
    }

    /// Outline vertices; closed shapes repeat nothing, the renderer closes them.
    pub fn outline(&self) -> Vec<Pos2> {
        match *self {
            Self::Rect { min, size } => vec![
                min,
                min + Vec2::new(size.x, 0.0),
                min + size,
                min + Vec2::new(0.0, size.y),
            ],
            Self::Triangle { min, size } => vec![
                min + Vec2::new(size.x / 2.0, 0.0),
                min + size,
                min + Vec2::new(0.0, size.y),
            ],
            Self::Polygon { min, size } => {
                regular_polygon(min + size / 2.0, size / 2.0, POLYGON_SIDES)
            }
            Self::Ellipse { center, radii } => regular_polygon(center, radii, ELLIPSE_SEGMENTS),
            Self::Line { start, end, .. } => vec![start, end],
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            Self::Rect { min, .. } | Self::Triangle { min, .. } | Self::Polygon { min, .. } => {
                *min += delta
            }
            Self::Ellipse { center, .. } => *center += delta,
            Self::Line { start, end, .. } => {
                *start += delta;
                *end += delta;
            }
        }
    }
}

fn regular_polygon(center: Pos2, radii: Vec2, sides: usize) -> Vec<Pos2> {
    // First vertex points straight up
    (0..sides)
        .map(|i| {
            let angle =
                i as f32 / sides as f32 * std::f32::consts::TAU - std::f32::consts::FRAC_PI_2;
            center + Vec2::new(angle.cos() * radii.x, angle.sin() * radii.y)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke: Color32,
    pub width: f32,
    pub fill: Option<Color32>,
}

/// Committed parametric shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    id: usize,
    kind: ShapeKind,
    geometry: ShapeGeometry,
    style: ShapeStyle,
    opacity: f32,
    visible: bool,
}

impl Shape {
    pub fn new(
        id: usize,
        kind: ShapeKind,
        geometry: ShapeGeometry,
        style: ShapeStyle,
        opacity: f32,
    ) -> Self {
        Self {
            id,
            kind,
            geometry,
            style,
            opacity,
            visible: true,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Width of the spanned box, ignoring stroke width
    pub fn width(&self) -> f32 {
        self.geometry.bounds().width()
    }

    pub fn height(&self) -> f32 {
        self.geometry.bounds().height()
    }

    pub fn set_geometry(&mut self, geometry: ShapeGeometry) {
        self.geometry = geometry;
    }

    /// Area the outline, its stroke and any arrow head can reach.
    fn paint_bounds(&self) -> Rect {
        let head = match self.geometry {
            ShapeGeometry::Line { arrow: true, .. } => {
                self.style.width.max(1.0) * ARROW_HEAD_FACTOR
            }
            _ => 0.0,
        };
        self.rect().expand(head)
    }

    /// Extra open segments drawn on top of the outline (arrow heads).
    fn decorations(&self) -> Vec<[Pos2; 2]> {
        let ShapeGeometry::Line { start, end, arrow: true } = self.geometry else {
            return Vec::new();
        };
        let direction = end - start;
        if direction.length() <= f32::EPSILON {
            return Vec::new();
        }
        let back = -direction.normalized() * self.style.width.max(1.0) * ARROW_HEAD_FACTOR;
        let barb = |angle: f32| end + rotate(back, angle);
        vec![[end, barb(0.5)], [end, barb(-0.5)]]
    }
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

impl Element for Shape {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> &'static str {
        self.kind.id()
    }

    fn rect(&self) -> Rect {
        self.geometry.bounds().expand(self.style.width / 2.0)
    }

    fn draw(&self, canvas: &mut Canvas) {
        let Some(mut target) = canvas.scratch(self.paint_bounds()) else {
            return;
        };
        let outline = self.geometry.outline();
        let closed = self.kind.is_closed();

        if let (Some(fill), true) = (self.style.fill, closed) {
            if let Some(path) = renderer::polyline(outline.iter().copied(), true) {
                target.fill(&path, &renderer::solid(fill, 1.0));
            }
        }

        let paint = renderer::solid(self.style.stroke, 1.0);
        if let Some(path) = renderer::polyline(outline, closed) {
            target.stroke(&path, self.style.width, &paint);
        }
        for [a, b] in self.decorations() {
            if let Some(path) = renderer::polyline([a, b], false) {
                target.stroke(&path, self.style.width, &paint);
            }
        }
        canvas.composite(&target, self.opacity, Composite::SourceOver);
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        let reach = self.style.width / 2.0 + HIT_TOLERANCE;
        match self.geometry {
            ShapeGeometry::Line { start, end, .. } => {
                common::distance_to_line_segment(pos, start, end) <= reach
            }
            _ => self.geometry.bounds().expand(reach).contains(pos),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.geometry.translate(delta);
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn style() -> ShapeStyle {
        ShapeStyle {
            stroke: Color32::BLACK,
            width: 2.0,
            fill: None,
        }
    }

    fn spanned(id: usize, kind: ShapeKind, anchor: Pos2, current: Pos2) -> Shape {
        Shape::new(id, kind, ShapeGeometry::span(kind, anchor, current), style(), 1.0)
    }

    #[test]
    fn rectangle_spans_absolute_deltas() {
        let geometry =
            ShapeGeometry::span(ShapeKind::Rectangle, pos2(110.0, 60.0), pos2(10.0, 10.0));
        let expected = ShapeGeometry::Rect {
            min: pos2(10.0, 10.0),
            size: Vec2::new(100.0, 50.0),
        };
        assert_eq!(geometry, expected);
    }

    #[test]
    fn circle_radii_are_half_the_deltas() {
        let geometry = ShapeGeometry::span(ShapeKind::Circle, pos2(0.0, 0.0), pos2(40.0, 20.0));
        let expected = ShapeGeometry::Ellipse {
            center: pos2(20.0, 10.0),
            radii: Vec2::new(20.0, 10.0),
        };
        assert_eq!(geometry, expected);
    }

    #[test]
    fn line_endpoint_follows_pointer() {
        let geometry = ShapeGeometry::span(ShapeKind::Arrow, pos2(5.0, 5.0), pos2(-20.0, 30.0));
        let expected = ShapeGeometry::Line {
            start: pos2(5.0, 5.0),
            end: pos2(-20.0, 30.0),
            arrow: true,
        };
        assert_eq!(geometry, expected);
    }

    #[test]
    fn polygon_outline_has_expected_sides() {
        let geometry = ShapeGeometry::span(ShapeKind::Polygon, pos2(0.0, 0.0), pos2(60.0, 60.0));
        assert_eq!(geometry.outline().len(), POLYGON_SIDES);
        let triangle = ShapeGeometry::span(ShapeKind::Triangle, pos2(0.0, 0.0), pos2(6.0, 6.0));
        assert_eq!(triangle.outline().len(), 3);
    }

    #[test]
    fn arrow_gets_two_barbs() {
        let arrow = spanned(1, ShapeKind::Arrow, pos2(0.0, 0.0), pos2(50.0, 0.0));
        assert_eq!(arrow.decorations().len(), 2);
        let line = spanned(2, ShapeKind::Line, pos2(0.0, 0.0), pos2(50.0, 0.0));
        assert!(line.decorations().is_empty());
    }

    #[test]
    fn arrow_head_stays_inside_paint_bounds() {
        let arrow = spanned(1, ShapeKind::Arrow, pos2(0.0, 20.0), pos2(50.0, 20.0));
        let bounds = arrow.paint_bounds();
        for [a, b] in arrow.decorations() {
            assert!(bounds.contains(a) && bounds.contains(b));
        }
    }
}
