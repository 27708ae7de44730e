use crate::brush::BrushKind;
use crate::element::{SceneObject, ShapeKind};
use crate::input::PointerSample;
use crate::tool::{FreehandTool, SelectionTool, ShapeTool, Tool, ToolContext, ToolOutcome};

/// The interaction mode that owns pointer input, together with its gesture state.
///
/// Exactly one mode is active at a time. Replacing the value drops the previous
/// mode's tool, and with it any pointer subscription the tool still held.
#[derive(Debug, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Drawing(FreehandTool),
    ShapePlacement(ShapeTool),
    Selecting(SelectionTool),
}

/// Copyable description of a [`ToolState`], for events and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Idle,
    Drawing(BrushKind),
    ShapePlacement(ShapeKind),
    Selecting,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Drawing(_) => "Drawing",
            Self::ShapePlacement(_) => "ShapePlacement",
            Self::Selecting => "Selecting",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drawing(kind) => write!(f, "Drawing({})", kind.id()),
            Self::ShapePlacement(kind) => write!(f, "ShapePlacement({})", kind.id()),
            other => f.write_str(other.name()),
        }
    }
}

impl ToolState {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Idle => ToolKind::Idle,
            Self::Drawing(tool) => ToolKind::Drawing(tool.kind()),
            Self::ShapePlacement(tool) => ToolKind::ShapePlacement(tool.kind()),
            Self::Selecting(_) => ToolKind::Selecting,
        }
    }
}

impl Tool for ToolState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Drawing(tool) => tool.name(),
            Self::ShapePlacement(tool) => tool.name(),
            Self::Selecting(tool) => tool.name(),
        }
    }

    fn on_pointer_down(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) {
        match self {
            Self::Idle => {}
            Self::Drawing(tool) => tool.on_pointer_down(sample, ctx),
            Self::ShapePlacement(tool) => tool.on_pointer_down(sample, ctx),
            Self::Selecting(tool) => tool.on_pointer_down(sample, ctx),
        }
    }

    fn on_pointer_move(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) {
        match self {
            Self::Idle => {}
            Self::Drawing(tool) => tool.on_pointer_move(sample, ctx),
            Self::ShapePlacement(tool) => tool.on_pointer_move(sample, ctx),
            Self::Selecting(tool) => tool.on_pointer_move(sample, ctx),
        }
    }

    fn on_pointer_up(&mut self, sample: PointerSample, ctx: &ToolContext<'_>) -> ToolOutcome {
        match self {
            Self::Idle => ToolOutcome::None,
            Self::Drawing(tool) => tool.on_pointer_up(sample, ctx),
            Self::ShapePlacement(tool) => tool.on_pointer_up(sample, ctx),
            Self::Selecting(tool) => tool.on_pointer_up(sample, ctx),
        }
    }

    fn cancel(&mut self) {
        match self {
            Self::Idle => {}
            Self::Drawing(tool) => tool.cancel(),
            Self::ShapePlacement(tool) => tool.cancel(),
            Self::Selecting(tool) => tool.cancel(),
        }
    }

    fn is_capturing(&self) -> bool {
        match self {
            Self::Idle => false,
            Self::Drawing(tool) => tool.is_capturing(),
            Self::ShapePlacement(tool) => tool.is_capturing(),
            Self::Selecting(tool) => tool.is_capturing(),
        }
    }

    fn preview(&self) -> Option<SceneObject> {
        match self {
            Self::Idle => None,
            Self::Drawing(tool) => tool.preview(),
            Self::ShapePlacement(tool) => tool.preview(),
            Self::Selecting(tool) => tool.preview(),
        }
    }
}
