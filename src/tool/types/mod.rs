pub mod brush;
pub mod selection;
pub mod shape;

pub use brush::FreehandTool;
pub use selection::SelectionTool;
pub use shape::ShapeTool;
