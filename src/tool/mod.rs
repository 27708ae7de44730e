use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::brush::BrushKind;
use crate::element::ShapeKind;

mod trait_def;
pub mod types;

pub use trait_def::{Tool, ToolContext, ToolOutcome};
pub use types::{FreehandTool, SelectionTool, ShapeTool};

/// Tool ids that trigger an action instead of switching tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    Undo,
    Redo,
    Clear,
}

/// Result of classifying a host tool id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSelection {
    Brush(BrushKind),
    Shape(ShapeKind),
    Select,
    Action(ToolAction),
    Unrecognized(String),
}

impl ToolSelection {
    pub fn classify(id: &str) -> Self {
        let normalized = id.trim().to_ascii_lowercase();
        if let Some(kind) = BrushKind::from_id(&normalized) {
            return Self::Brush(kind);
        }
        if let Some(kind) = ShapeKind::from_id(&normalized) {
            return Self::Shape(kind);
        }
        match normalized.as_str() {
            "select" | "move" => Self::Select,
            "undo" => Self::Action(ToolAction::Undo),
            "redo" => Self::Action(ToolAction::Redo),
            "clear" => Self::Action(ToolAction::Clear),
            _ => Self::Unrecognized(id.to_string()),
        }
    }
}

/// Optional extras the host may pass along with `select_tool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    /// Interior colour for closed shapes
    pub fill: Option<Color32>,
    /// Outline width for shapes; the brush width is used when absent
    pub stroke_width: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_family() {
        assert_eq!(ToolSelection::classify("airbrush"), ToolSelection::Brush(BrushKind::Airbrush));
        assert_eq!(
            ToolSelection::classify(" Rectangle "),
            ToolSelection::Shape(ShapeKind::Rectangle)
        );
        assert_eq!(ToolSelection::classify("move"), ToolSelection::Select);
        assert_eq!(ToolSelection::classify("redo"), ToolSelection::Action(ToolAction::Redo));
        assert_eq!(
            ToolSelection::classify("lasso"),
            ToolSelection::Unrecognized("lasso".to_string())
        );
    }
}
