//! Brush profiles and the resolver that turns a brush kind plus basic parameters
//! into a concrete stroke-rendering style.

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

/// Dots emitted per sample step by the airbrush.
pub const SPRAY_DENSITY: u32 = 12;
/// Radius of a single airbrush dot, in surface units.
pub const SPRAY_DOT_RADIUS: f32 = 1.0;
/// Edge length of the procedurally generated pattern tile, in pixels.
pub const PATTERN_TILE_SIZE: u32 = 8;
/// Beyond this the smoothed point would barely follow the pointer.
pub const MAX_SMOOTHING: f32 = 0.9;

/// The rendering behaviours a freehand stroke can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    Pencil,
    Marker,
    Airbrush,
    Textured,
    Crayon,
    Oil,
    Watercolor,
    Eraser,
}

impl BrushKind {
    pub const ALL: [BrushKind; 8] = [
        BrushKind::Pencil,
        BrushKind::Marker,
        BrushKind::Airbrush,
        BrushKind::Textured,
        BrushKind::Crayon,
        BrushKind::Oil,
        BrushKind::Watercolor,
        BrushKind::Eraser,
    ];

    /// Parses a host tool id. Accepts the aliases the toolbar uses.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "pencil" | "brush" => Some(Self::Pencil),
            "marker" => Some(Self::Marker),
            "airbrush" | "spray" => Some(Self::Airbrush),
            "textured" | "pattern" => Some(Self::Textured),
            "crayon" => Some(Self::Crayon),
            "oil" => Some(Self::Oil),
            "watercolor" => Some(Self::Watercolor),
            "eraser" => Some(Self::Eraser),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Pencil => "pencil",
            Self::Marker => "marker",
            Self::Airbrush => "airbrush",
            Self::Textured => "textured",
            Self::Crayon => "crayon",
            Self::Oil => "oil",
            Self::Watercolor => "watercolor",
            Self::Eraser => "eraser",
        }
    }
}

/// The inputs the resolver needs besides the kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushParams {
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
}

/// The active freehand configuration of a surface.
///
/// Changing it only affects strokes started afterwards; committed strokes keep
/// the [`StrokeStyle`] they were resolved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushProfile {
    pub color: Color32,
    /// Nominal width, always > 0
    pub width: f32,
    /// 0.0..=1.0
    pub opacity: f32,
    /// 0.0 keeps raw pointer samples, values towards 1.0 lag further behind the pointer
    pub smoothing: f32,
    pub pressure_sensitive: bool,
    pub kind: BrushKind,
}

impl Default for BrushProfile {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 5.0,
            opacity: 1.0,
            smoothing: 0.3,
            pressure_sensitive: true,
            kind: BrushKind::Pencil,
        }
    }
}

impl BrushProfile {
    pub fn params(&self) -> BrushParams {
        BrushParams {
            color: self.color,
            width: self.width,
            opacity: self.opacity,
        }
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    /// Rejects non-positive or non-finite widths. Returns whether the width changed.
    pub fn set_width(&mut self, width: f32) -> bool {
        if !width.is_finite() || width <= 0.0 {
            log::debug!("Ignoring invalid brush width {width}");
            return false;
        }
        self.width = width;
        true
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_unit(opacity);
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = clamp_unit(smoothing).min(MAX_SMOOTHING);
    }

    /// Resolves the profile's own kind with its own parameters.
    pub fn resolve(&self) -> StrokeStyle {
        resolve(self.kind, self.params())
    }
}

/// How a stroke is combined with what is already on its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Composite {
    SourceOver,
    /// Removes existing coverage along the path
    DestinationOut,
}

/// A small tile that is repeated along a textured stroke instead of a solid colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternTile {
    pub size: u32,
    pub pixels: Vec<Color32>,
}

impl PatternTile {
    /// Solid base colour with a sparse speckle of lighter pixels.
    pub fn generate(base: Color32, size: u32) -> Self {
        let size = size.max(1);
        let speckle = lighten(base, 0.45);
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if scatter_hash(x, y, 0x5eed) % 7 == 0 { speckle } else { base }
            })
            .collect();
        Self { size, pixels }
    }
}

/// Extra per-kind behaviour layered on top of the basic line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrokeEffect {
    None,
    /// Soft halo drawn beneath the stroke
    Glow { color: Color32, blur: f32 },
    /// Offset halo drawn beneath the stroke
    Shadow { color: Color32, offset: Vec2, blur: f32 },
    /// The path is rendered as scattered dots instead of a continuous line
    Spray { density: u32, dot_radius: f32 },
    /// The path is filled by tiling a pattern instead of a solid colour
    Pattern(PatternTile),
}

/// Concrete rendering configuration for one stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub kind: BrushKind,
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
    /// Caps and joins are always round; kept explicit for the renderer
    pub round_caps: bool,
    pub composite: Composite,
    pub effect: StrokeEffect,
}

/// Maps a brush kind and its parameters to a stroke style.
///
/// Pure and deterministic: identical inputs always produce identical styles.
pub fn resolve(kind: BrushKind, params: BrushParams) -> StrokeStyle {
    let BrushParams { color, width, opacity } = params;
    let opacity = clamp_unit(opacity);

    let (width, opacity, composite, effect) = match kind {
        BrushKind::Pencil => (width, opacity, Composite::SourceOver, StrokeEffect::None),
        BrushKind::Marker => (
            width * 1.5,
            opacity * 0.9,
            Composite::SourceOver,
            StrokeEffect::Glow { color, blur: 4.0 },
        ),
        BrushKind::Airbrush => (
            width * 2.0,
            opacity * 0.8,
            Composite::SourceOver,
            StrokeEffect::Spray {
                density: SPRAY_DENSITY,
                dot_radius: SPRAY_DOT_RADIUS,
            },
        ),
        BrushKind::Textured => (
            width,
            opacity,
            Composite::SourceOver,
            StrokeEffect::Pattern(PatternTile::generate(color, PATTERN_TILE_SIZE)),
        ),
        BrushKind::Crayon => (
            width * 1.2,
            0.75,
            Composite::SourceOver,
            StrokeEffect::Shadow {
                color: Color32::from_rgba_unmultiplied(0, 0, 0, 77),
                offset: Vec2::new(1.0, 1.0),
                blur: 2.0,
            },
        ),
        BrushKind::Oil => (
            width * 1.3,
            0.95,
            Composite::SourceOver,
            StrokeEffect::Glow { color, blur: 6.0 },
        ),
        BrushKind::Watercolor => (
            width * 1.4,
            0.45,
            Composite::SourceOver,
            StrokeEffect::Glow { color, blur: 15.0 },
        ),
        BrushKind::Eraser => (width * 2.0, 1.0, Composite::DestinationOut, StrokeEffect::None),
    };

    StrokeStyle {
        kind,
        color,
        width,
        opacity,
        round_caps: true,
        composite,
        effect,
    }
}

pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Mixes `color` towards white by `amount` (0..=1).
pub(crate) fn lighten(color: Color32, amount: f32) -> Color32 {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
    Color32::from_rgba_unmultiplied(mix(r), mix(g), mix(b), a)
}

/// Cheap integer hash used wherever the renderer needs repeatable "random" values.
pub(crate) fn scatter_hash(x: u32, y: u32, salt: u32) -> u32 {
    let mut h = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(salt.wrapping_mul(1013904223));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// Maps a hash to 0.0..1.0.
pub(crate) fn unit_hash(x: u32, y: u32, salt: u32) -> f32 {
    (scatter_hash(x, y, salt) % 10_000) as f32 / 10_000.0
}
