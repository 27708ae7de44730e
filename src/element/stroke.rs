use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::Element;
use crate::brush::{StrokeEffect, StrokeStyle, unit_hash};
use crate::element::common::{self, HIT_TOLERANCE};
use crate::renderer::{self, Canvas, Piece};

/// Strength of the halo drawn under glowing strokes
const GLOW_STRENGTH: f32 = 0.5;

/// One captured sample of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub pos: Pos2,
    /// Effective width at this sample, pressure already applied
    pub width: f32,
}

/// A single airbrush dot produced from a stroke path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprayDot {
    pub center: Pos2,
    pub radius: f32,
    /// Multiplier on the stroke opacity
    pub alpha: f32,
}

/// Committed freehand stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: usize,
    points: Vec<StrokePoint>,
    style: StrokeStyle,
    opacity: f32,
    visible: bool,
}

impl Stroke {
    pub fn new(id: usize, points: Vec<StrokePoint>, style: StrokeStyle) -> Self {
        let opacity = style.opacity;
        Self {
            id,
            points,
            style,
            opacity,
            visible: true,
        }
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    fn max_width(&self) -> f32 {
        self.points.iter().map(|p| p.width).fold(0.0, f32::max)
    }

    /// Scatters the airbrush dots along the path.
    ///
    /// Placement only depends on the path and the style, so the same stroke
    /// always sprays the same dots.
    pub fn spray_dots(&self) -> Vec<SprayDot> {
        let StrokeEffect::Spray { density, dot_radius } = self.style.effect else {
            return Vec::new();
        };

        let mut samples = Vec::new();
        match self.points.as_slice() {
            [] => {}
            [only] => samples.push(*only),
            points => {
                for pair in points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    let length = (b.pos - a.pos).length();
                    let step = (a.width / 2.0).max(1.0);
                    let steps = (length / step).ceil().max(1.0) as usize;
                    for i in 0..steps {
                        let t = i as f32 / steps as f32;
                        samples.push(StrokePoint {
                            pos: a.pos + (b.pos - a.pos) * t,
                            width: a.width + (b.width - a.width) * t,
                        });
                    }
                }
                if let Some(last) = points.last() {
                    samples.push(*last);
                }
            }
        }

        let mut dots = Vec::with_capacity(samples.len() * density as usize);
        for (i, sample) in samples.iter().enumerate() {
            let spread = sample.width / 2.0;
            for d in 0..density {
                let (i, d) = (i as u32, d);
                let angle = unit_hash(i, d, 1) * std::f32::consts::TAU;
                let distance = spread * unit_hash(i, d, 2).sqrt();
                dots.push(SprayDot {
                    center: sample.pos + Vec2::angled(angle) * distance,
                    radius: dot_radius,
                    alpha: 0.3 + 0.7 * unit_hash(i, d, 3),
                });
            }
        }
        dots
    }

    /// Everything the stroke can paint, halos and spray included.
    fn paint_bounds(&self) -> Rect {
        let reach = match self.style.effect {
            StrokeEffect::Glow { blur, .. } => blur,
            StrokeEffect::Shadow { offset, blur, .. } => offset.x.abs().max(offset.y.abs()) + blur,
            StrokeEffect::Spray { dot_radius, .. } => dot_radius,
            StrokeEffect::None | StrokeEffect::Pattern(_) => 0.0,
        };
        self.rect().expand(reach)
    }

    /// The path as drawable pieces, each with its own width.
    ///
    /// A constant-width stroke is one polyline so its joins stay clean; pressure
    /// strokes are split per segment with the mean width of both ends.
    fn pieces(&self) -> Vec<Piece> {
        match self.points.as_slice() {
            [] => Vec::new(),
            [only] => vec![Piece::Dot {
                center: only.pos,
                width: only.width,
            }],
            points if points.windows(2).all(|pair| pair[0].width == pair[1].width) => {
                let width = points[0].width;
                let piece = match renderer::polyline(points.iter().map(|p| p.pos), false) {
                    Some(path) => Piece::Line { path, width },
                    None => Piece::Dot {
                        center: points[0].pos,
                        width,
                    },
                };
                vec![piece]
            }
            points => points
                .windows(2)
                .map(|pair| {
                    let width = (pair[0].width + pair[1].width) / 2.0;
                    match renderer::polyline([pair[0].pos, pair[1].pos], false) {
                        Some(path) => Piece::Line { path, width },
                        None => Piece::Dot {
                            center: pair[0].pos,
                            width,
                        },
                    }
                })
                .collect(),
        }
    }
}

impl Element for Stroke {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "stroke"
    }

    fn rect(&self) -> Rect {
        let padding = self.max_width() / 2.0;
        common::calculate_bounds(self.points.iter().map(|p| p.pos), padding)
    }

    fn draw(&self, canvas: &mut Canvas) {
        let Some(mut target) = canvas.scratch(self.paint_bounds()) else {
            return;
        };
        let color = self.style.color;

        if let StrokeEffect::Spray { .. } = self.style.effect {
            for dot in self.spray_dots() {
                if let Some(path) = renderer::circle(dot.center, dot.radius) {
                    target.fill(&path, &renderer::solid(color, dot.alpha));
                }
            }
            canvas.composite(&target, self.opacity, self.style.composite);
            return;
        }

        let pieces = self.pieces();
        match &self.style.effect {
            StrokeEffect::Glow { color: glow, blur } => {
                target.halo(&pieces, *blur, *glow, GLOW_STRENGTH, Vec2::ZERO);
            }
            StrokeEffect::Shadow { color: shadow, offset, blur } => {
                let [.., a] = shadow.to_srgba_unmultiplied();
                target.halo(&pieces, *blur, *shadow, a as f32 / 255.0, *offset);
            }
            StrokeEffect::None | StrokeEffect::Pattern(_) | StrokeEffect::Spray { .. } => {}
        }

        let tile = match &self.style.effect {
            StrokeEffect::Pattern(tile) => renderer::tile_pixmap(tile),
            _ => None,
        };
        let paint = match &tile {
            Some(tile) => renderer::pattern(tile),
            None => renderer::solid(color, 1.0),
        };
        target.paint_pieces(&pieces, &paint);
        canvas.composite(&target, self.opacity, self.style.composite);
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => only.pos.distance(pos) <= only.width / 2.0 + HIT_TOLERANCE,
            points => points.windows(2).any(|pair| {
                let reach = pair[0].width.max(pair[1].width) / 2.0 + HIT_TOLERANCE;
                common::distance_to_line_segment(pos, pair[0].pos, pair[1].pos) <= reach
            }),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            point.pos += delta;
        }
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
    use crate::brush::{BrushKind, BrushParams, resolve};
    use egui::{Color32, pos2};

    fn path(style: StrokeStyle) -> Stroke {
        let width = style.width;
        let points = (0..5)
            .map(|i| StrokePoint {
                pos: pos2(10.0 + i as f32 * 20.0, 20.0),
                width,
            })
            .collect();
        Stroke::new(1, points, style)
    }

    fn params() -> BrushParams {
        BrushParams {
            color: Color32::BLUE,
            width: 4.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn spray_dots_are_repeatable_and_stay_near_the_path() {
        let stroke = path(resolve(BrushKind::Airbrush, params()));
        let dots = stroke.spray_dots();
        assert!(!dots.is_empty());
        assert_eq!(dots, stroke.spray_dots());
        for dot in &dots {
            assert!((dot.center.y - 20.0).abs() <= 4.0 + 1e-3);
            assert!((0.3..=1.0).contains(&dot.alpha));
        }
    }

    #[test]
    fn only_airbrush_sprays() {
        assert!(path(resolve(BrushKind::Pencil, params())).spray_dots().is_empty());
    }

    #[test]
    fn pressure_stroke_splits_into_segments() {
        let uniform = path(resolve(BrushKind::Pencil, params()));
        assert_eq!(uniform.pieces().len(), 1);

        let mut points = uniform.points().to_vec();
        points[2].width = 9.0;
        let tapered = Stroke::new(2, points, resolve(BrushKind::Pencil, params()));
        assert_eq!(tapered.pieces().len(), 4);

        let tap = Stroke::new(3, vec![uniform.points()[0]], resolve(BrushKind::Pencil, params()));
        assert_eq!(tap.pieces().len(), 1);
    }

    #[test]
    fn halo_effects_widen_the_painted_area() {
        let pencil = path(resolve(BrushKind::Pencil, params()));
        let marker = path(resolve(BrushKind::Marker, params()));
        assert_eq!(pencil.paint_bounds(), pencil.rect());
        assert!(marker.paint_bounds().contains_rect(marker.rect()));
        assert!(marker.paint_bounds().width() > marker.rect().width());
    }

    #[test]
    fn hit_test_and_translate() {
        let mut stroke = path(resolve(BrushKind::Pencil, params()));
        assert!(stroke.hit_test(pos2(50.0, 22.0)));
        assert!(!stroke.hit_test(pos2(50.0, 40.0)));
        stroke.translate(Vec2::new(0.0, 20.0));
        assert!(stroke.hit_test(pos2(50.0, 40.0)));
        assert_eq!(stroke.rect().min.y, 38.0);
    }
}
