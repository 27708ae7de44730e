use egui::Vec2;

use crate::state::ToolKind;

/// Notifications a host can subscribe to.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ToolChanged {
        old: ToolKind,
        new: ToolKind,
    },
    /// Layer stack or layer attributes changed
    LayersChanged {
        count: usize,
        active: usize,
    },
    ObjectCommitted {
        layer: usize,
        object_id: usize,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    Resized {
        size: Vec2,
    },
    Disposed,
}
