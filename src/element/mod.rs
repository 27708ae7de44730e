use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::renderer::Canvas;

pub(crate) mod common;
pub mod shape;
pub mod stroke;

pub use shape::{Shape, ShapeGeometry, ShapeKind, ShapeStyle};
pub use stroke::{SprayDot, Stroke, StrokePoint};

/// Common trait that all scene objects implement
pub trait Element {
    /// Get the unique identifier for this element
    fn id(&self) -> usize;

    /// Get the element type as a string
    fn element_type(&self) -> &'static str;

    /// Get the bounding rectangle for this element, including stroke width
    fn rect(&self) -> Rect;

    /// Rasterize the element onto the canvas
    fn draw(&self, canvas: &mut Canvas);

    /// Test if the element contains the given position
    fn hit_test(&self, pos: Pos2) -> bool;

    /// Translate the element by the given delta
    fn translate(&mut self, delta: Vec2);

    fn opacity(&self) -> f32;

    fn set_opacity(&mut self, opacity: f32);

    /// Effective visibility, driven by the owning layer
    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);
}

/// A committed vector primitive owned by exactly one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneObject {
    Stroke(Stroke),
    Shape(Shape),
}

impl SceneObject {
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Self::Stroke(stroke) => Some(stroke),
            Self::Shape(_) => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Self::Shape(shape) => Some(shape),
            Self::Stroke(_) => None,
        }
    }

    fn inner(&self) -> &dyn Element {
        match self {
            Self::Stroke(stroke) => stroke,
            Self::Shape(shape) => shape,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Element {
        match self {
            Self::Stroke(stroke) => stroke,
            Self::Shape(shape) => shape,
        }
    }
}

impl Element for SceneObject {
    fn id(&self) -> usize {
        self.inner().id()
    }

    fn element_type(&self) -> &'static str {
        self.inner().element_type()
    }

    fn rect(&self) -> Rect {
        self.inner().rect()
    }

    fn draw(&self, canvas: &mut Canvas) {
        self.inner().draw(canvas)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.inner().hit_test(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.inner_mut().translate(delta)
    }

    fn opacity(&self) -> f32 {
        self.inner().opacity()
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.inner_mut().set_opacity(opacity)
    }

    fn is_visible(&self) -> bool {
        self.inner().is_visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.inner_mut().set_visible(visible)
    }
}

impl From<Stroke> for SceneObject {
    fn from(stroke: Stroke) -> Self {
        Self::Stroke(stroke)
    }
}

impl From<Shape> for SceneObject {
    fn from(shape: Shape) -> Self {
        Self::Shape(shape)
    }
}
