use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use crate::brush::BrushProfile;
use crate::command::MAX_HISTORY_DEPTH;
use crate::error::{ConfigError, SurfaceError, SurfaceResult};

/// Engine tunables. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Undo entries kept, clamped to `1..=MAX_HISTORY_DEPTH`
    pub history_limit: usize,
    /// Prefix for generated layer names ("Layer 1", "Layer 2", ...)
    pub default_layer_name: String,
    /// Fill painted under all layers on export. Transparent when absent.
    pub background: Option<Color32>,
    /// Width multiplier applied at zero pressure
    pub min_pressure_multiplier: f32,
    pub export_scale: f32,
    pub max_export_scale: f32,
    /// Largest accepted surface width or height, in surface units
    pub max_surface_dimension: f32,
    /// Largest rendered image, in pixels, after the export scale is applied
    pub max_export_pixels: u64,
    /// Brush profile a fresh surface starts with
    pub brush: BrushProfile,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            history_limit: MAX_HISTORY_DEPTH,
            default_layer_name: "Layer".to_string(),
            background: None,
            min_pressure_multiplier: 0.2,
            export_scale: 2.0,
            max_export_scale: 8.0,
            max_surface_dimension: 16_384.0,
            max_export_pixels: 64 * 1024 * 1024,
            brush: BrushProfile::default(),
        }
    }
}

impl SurfaceConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.min_pressure_multiplier = config.min_pressure_multiplier.clamp(0.0, 1.0);
        if !config.brush.set_width(config.brush.width) {
            config.brush.width = BrushProfile::default().width;
        }
        log::debug!("Loaded surface config: {config:?}");
        Ok(config)
    }

    pub fn effective_history_limit(&self) -> usize {
        self.history_limit.clamp(1, MAX_HISTORY_DEPTH)
    }

    /// Refuses sizes beyond `max_surface_dimension` on either axis.
    pub fn check_size(&self, size: Vec2) -> SurfaceResult<()> {
        if size.x > self.max_surface_dimension || size.y > self.max_surface_dimension {
            return Err(SurfaceError::InvalidSize(size.x, size.y));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushKind;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "default_layer_name": "Sheet", "brush": { "kind": "marker" } }"#;
        let config = SurfaceConfig::from_json(json).unwrap();
        assert_eq!(config.default_layer_name, "Sheet");
        assert_eq!(config.brush.kind, BrushKind::Marker);
        assert_eq!(config.brush.width, BrushProfile::default().width);
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn history_limit_is_capped() {
        let config = SurfaceConfig {
            history_limit: 500,
            ..SurfaceConfig::default()
        };
        assert_eq!(config.effective_history_limit(), 50);
        let config = SurfaceConfig {
            history_limit: 0,
            ..SurfaceConfig::default()
        };
        assert_eq!(config.effective_history_limit(), 1);
    }

    #[test]
    fn oversized_dimensions_are_refused() {
        let config = SurfaceConfig::default();
        assert!(config.check_size(Vec2::new(1280.0, 720.0)).is_ok());
        assert!(config.check_size(Vec2::new(200_000.0, 10.0)).is_err());
        assert!(config.check_size(Vec2::new(10.0, 200_000.0)).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(SurfaceConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_brush_width_falls_back() {
        let config = SurfaceConfig::from_json(r#"{ "brush": { "width": -3.0 } }"#).unwrap();
        assert_eq!(config.brush.width, 5.0);
    }
}
