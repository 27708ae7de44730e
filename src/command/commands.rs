use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use crate::brush::BrushKind;
use crate::surface::DrawingSurface;
use crate::tool::ToolOptions;

/// Commands a host can send to a surface, as plain data.
///
/// Serialized with an internal `command` tag, e.g.
/// `{"command": "set_layer_opacity", "index": 0, "value": 0.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Switch interaction mode, or run undo/redo/clear
    SelectTool {
        id: String,
        #[serde(default)]
        options: ToolOptions,
    },

    /// Replace the basic brush parameters, optionally switching brush kind
    SetBrush {
        color: Color32,
        width: f32,
        opacity: f32,
        #[serde(default)]
        kind: Option<BrushKind>,
    },

    SetColor {
        color: Color32,
    },

    SetWidth {
        width: f32,
    },

    SetBrushOpacity {
        opacity: f32,
    },

    SetSmoothing {
        smoothing: f32,
    },

    SetPressureSensitivity {
        enabled: bool,
    },

    AddLayer,

    SelectLayer {
        index: usize,
    },

    ToggleVisibility {
        index: usize,
    },

    ToggleLock {
        index: usize,
    },

    RemoveLayer {
        index: usize,
    },

    SetLayerOpacity {
        index: usize,
        value: f32,
    },

    Undo,

    Redo,

    Clear,

    /// The host container changed size
    Resize {
        width: f32,
        height: f32,
    },
}

impl Command {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectTool { .. } => "select_tool",
            Self::SetBrush { .. } => "set_brush",
            Self::SetColor { .. } => "set_color",
            Self::SetWidth { .. } => "set_width",
            Self::SetBrushOpacity { .. } => "set_brush_opacity",
            Self::SetSmoothing { .. } => "set_smoothing",
            Self::SetPressureSensitivity { .. } => "set_pressure_sensitivity",
            Self::AddLayer => "add_layer",
            Self::SelectLayer { .. } => "select_layer",
            Self::ToggleVisibility { .. } => "toggle_visibility",
            Self::ToggleLock { .. } => "toggle_lock",
            Self::RemoveLayer { .. } => "remove_layer",
            Self::SetLayerOpacity { .. } => "set_layer_opacity",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Clear => "clear",
            Self::Resize { .. } => "resize",
        }
    }

    /// Runs the command against `surface`. Returns false when it was refused.
    pub fn apply(self, surface: &mut DrawingSurface) -> bool {
        log::debug!("Applying command {}", self.name());
        match self {
            Self::SelectTool { id, options } => surface.select_tool(&id, options),
            Self::SetBrush {
                color,
                width,
                opacity,
                kind,
            } => surface.set_brush(color, width, opacity, kind),
            Self::SetColor { color } => surface.set_color(color),
            Self::SetWidth { width } => surface.set_width(width),
            Self::SetBrushOpacity { opacity } => surface.set_brush_opacity(opacity).is_some(),
            Self::SetSmoothing { smoothing } => surface.set_smoothing(smoothing).is_some(),
            Self::SetPressureSensitivity { enabled } => surface.set_pressure_sensitivity(enabled),
            Self::AddLayer => surface.add_layer().is_some(),
            Self::SelectLayer { index } => surface.select_layer(index),
            Self::ToggleVisibility { index } => surface.toggle_visibility(index).is_some(),
            Self::ToggleLock { index } => surface.toggle_lock(index).is_some(),
            Self::RemoveLayer { index } => surface.remove_layer(index),
            Self::SetLayerOpacity { index, value } => {
                surface.set_layer_opacity(index, value).is_some()
            }
            Self::Undo => surface.undo(),
            Self::Redo => surface.redo(),
            Self::Clear => surface.clear(),
            Self::Resize { width, height } => surface.resize(Vec2::new(width, height)),
        }
    }
}
