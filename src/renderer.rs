//! Rasterizer backing `export`, built on tiny-skia.
//!
//! Every object is drawn at full strength into a [`Scratch`] pixmap that only
//! covers its own bounds, then composited once with its opacity. A translucent
//! stroke therefore never darkens where its own segments overlap, and the cost
//! of an object does not depend on the size of the surface.

use std::io::Cursor;

use egui::{Color32, Pos2, Rect, Vec2};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, Path, PathBuilder,
    Pattern, Pixmap, PixmapPaint, SpreadMode, Transform,
};

use crate::brush::{Composite, PatternTile, clamp_unit};
use crate::document::Document;
use crate::element::Element;
use crate::error::ExportError;

/// Pixels kept around an object's bounds for anti-aliased edges.
const EDGE_MARGIN: f32 = 2.0;
/// Concentric passes used to fake a soft halo.
const HALO_RINGS: u32 = 4;

/// Encodings the surface can export to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    /// "raster" is the host's historical name for PNG.
    pub fn parse(name: &str) -> Result<Self, ExportError> {
        match name.to_ascii_lowercase().as_str() {
            "raster" | "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Solid paint using `color` without its own alpha, at `alpha` strength.
pub fn solid(color: Color32, alpha: f32) -> Paint<'static> {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, (clamp_unit(alpha) * 255.0).round() as u8);
    paint
}

/// Opaque pixmap of a pattern tile, one tile pixel per surface unit.
pub fn tile_pixmap(tile: &PatternTile) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(tile.size, tile.size)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(&tile.pixels) {
        let [r, g, b, _] = src.to_srgba_unmultiplied();
        *dst = ColorU8::from_rgba(r, g, b, 255).premultiply();
    }
    Some(pixmap)
}

/// Paint that repeats `tile` across whatever it fills.
pub fn pattern(tile: &Pixmap) -> Paint<'_> {
    let mut paint = Paint::default();
    paint.shader = Pattern::new(
        tile.as_ref(),
        SpreadMode::Repeat,
        FilterQuality::Nearest,
        1.0,
        Transform::identity(),
    );
    paint
}

/// Open or closed polyline through `points`. `None` when every point coincides.
pub fn polyline(points: impl IntoIterator<Item = Pos2>, closed: bool) -> Option<Path> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    let mut moved = false;
    for point in points {
        moved |= point != first;
        builder.line_to(point.x, point.y);
    }
    if !moved {
        return None;
    }
    if closed {
        builder.close();
    }
    builder.finish()
}

pub fn circle(center: Pos2, radius: f32) -> Option<Path> {
    PathBuilder::from_circle(center.x, center.y, radius)
}

/// A drawable part of a freehand path.
#[derive(Debug, Clone)]
pub enum Piece {
    /// Open polyline stroked at a constant width
    Line { path: Path, width: f32 },
    /// Round dot `width` across, for taps and zero-length segments
    Dot { center: Pos2, width: f32 },
}

/// Object-sized drawing target. Coordinates are in surface units.
pub struct Scratch {
    pixmap: Pixmap,
    x: i32,
    y: i32,
    transform: Transform,
}

impl Scratch {
    #[cfg(test)]
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Strokes `path` with round caps and joins.
    pub fn stroke(&mut self, path: &Path, width: f32, paint: &Paint<'_>) {
        self.stroke_with(path, width, paint, self.transform);
    }

    fn stroke_with(&mut self, path: &Path, width: f32, paint: &Paint<'_>, transform: Transform) {
        let stroke = tiny_skia::Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap.stroke_path(path, paint, &stroke, transform, None);
    }

    pub fn fill(&mut self, path: &Path, paint: &Paint<'_>) {
        self.pixmap.fill_path(path, paint, FillRule::EvenOdd, self.transform, None);
    }

    /// Draws `pieces`, each grown by `extra` units across.
    fn draw_pieces(
        &mut self,
        pieces: &[Piece],
        extra: f32,
        paint: &Paint<'_>,
        transform: Transform,
    ) {
        for piece in pieces {
            match piece {
                Piece::Line { path, width } => {
                    self.stroke_with(path, width + extra, paint, transform);
                }
                Piece::Dot { center, width } => {
                    if let Some(path) = circle(*center, (width + extra) / 2.0) {
                        self.pixmap.fill_path(&path, paint, FillRule::Winding, transform, None);
                    }
                }
            }
        }
    }

    pub fn paint_pieces(&mut self, pieces: &[Piece], paint: &Paint<'_>) {
        self.draw_pieces(pieces, 0.0, paint, self.transform);
    }

    /// Soft fringe `blur` units wide around `pieces`, shifted by `offset`.
    pub fn halo(
        &mut self,
        pieces: &[Piece],
        blur: f32,
        color: Color32,
        strength: f32,
        offset: Vec2,
    ) {
        let transform = self.transform.pre_translate(offset.x, offset.y);
        let paint = solid(color, strength / HALO_RINGS as f32);
        for ring in (1..=HALO_RINGS).rev() {
            let spread = blur * ring as f32 / HALO_RINGS as f32;
            self.draw_pieces(pieces, spread * 2.0, &paint, transform);
        }
    }
}

/// A premultiplied RGBA target measured in surface units times `scale`.
pub struct Canvas {
    pixmap: Pixmap,
    scale: f32,
}

impl Canvas {
    pub fn new(width: u32, height: u32, scale: f32) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::Allocation(width, height))?;
        Ok(Self { pixmap, scale })
    }

    /// Opens a scratch target over `bounds`, clipped to the canvas.
    ///
    /// `None` when the bounds miss the canvas entirely.
    pub fn scratch(&self, bounds: Rect) -> Option<Scratch> {
        let (width, height) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
        let x0 = ((bounds.min.x * self.scale).floor() - EDGE_MARGIN).max(0.0);
        let y0 = ((bounds.min.y * self.scale).floor() - EDGE_MARGIN).max(0.0);
        let x1 = ((bounds.max.x * self.scale).ceil() + EDGE_MARGIN).min(width);
        let y1 = ((bounds.max.y * self.scale).ceil() + EDGE_MARGIN).min(height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        let pixmap = Pixmap::new((x1 - x0) as u32, (y1 - y0) as u32)?;
        Some(Scratch {
            pixmap,
            x: x0 as i32,
            y: y0 as i32,
            transform: Transform::from_row(self.scale, 0.0, 0.0, self.scale, -x0, -y0),
        })
    }

    /// Blends a finished scratch target into place.
    pub fn composite(&mut self, scratch: &Scratch, opacity: f32, composite: Composite) {
        let blend_mode = match composite {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::DestinationOut => BlendMode::DestinationOut,
        };
        let paint = PixmapPaint {
            opacity: clamp_unit(opacity),
            blend_mode,
            quality: FilterQuality::Nearest,
        };
        self.pixmap.draw_pixmap(
            scratch.x,
            scratch.y,
            scratch.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    pub fn fill(&mut self, color: Color32) {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    /// Source-over of a whole other canvas onto this one.
    pub fn draw_canvas(&mut self, other: &Canvas) {
        self.pixmap.draw_pixmap(
            0,
            0,
            other.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Straight-alpha copy of the pixels.
    pub fn into_image(self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
        }
        image
    }
}

fn render(document: &Document, scale: f32, max_pixels: u64) -> Result<Canvas, ExportError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ExportError::InvalidScale(scale));
    }
    let size = document.size();
    let width = (size.x * scale).round();
    let height = (size.y * scale).round();
    if width < 1.0 || height < 1.0 {
        return Err(ExportError::EmptySurface);
    }
    if f64::from(width) * f64::from(height) > max_pixels as f64 {
        return Err(ExportError::TooLarge {
            width: width as u64,
            height: height as u64,
            limit: max_pixels,
        });
    }
    let (width, height) = (width as u32, height as u32);

    let mut output = Canvas::new(width, height, scale)?;
    if let Some(background) = document.background() {
        output.fill(background);
    }

    for layer in document.layers().iter().filter(|layer| layer.visible) {
        let mut objects = layer.objects.iter().filter(|object| object.is_visible()).peekable();
        if objects.peek().is_none() {
            continue;
        }
        // Each layer gets its own target so erasers only cut through their own layer
        let mut target = Canvas::new(width, height, scale)?;
        for object in objects {
            object.draw(&mut target);
        }
        output.draw_canvas(&target);
    }

    log::debug!("Rendered {} layers at {width}x{height}", document.layers().len());
    Ok(output)
}

/// Composes every visible layer of `document`, bottom to top.
///
/// Hidden layers and hidden objects are skipped; lock state is irrelevant.
/// Targets above `max_pixels` are refused before anything is allocated.
pub fn render_document(
    document: &Document,
    scale: f32,
    max_pixels: u64,
) -> Result<RgbaImage, ExportError> {
    Ok(render(document, scale, max_pixels)?.into_image())
}

/// Renders and encodes the document. Never touches history.
pub fn export(
    document: &Document,
    format: ExportFormat,
    scale: f32,
    max_pixels: u64,
) -> Result<Vec<u8>, ExportError> {
    let canvas = render(document, scale, max_pixels)?;
    let mut bytes = Cursor::new(Vec::new());
    match format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(canvas.into_image()).write_to(&mut bytes, ImageFormat::Png)?;
        }
        ExportFormat::Jpeg => {
            // JPEG has no alpha; flatten over the background or white
            let backdrop = document.background().unwrap_or(Color32::WHITE);
            let mut flat = Canvas::new(canvas.pixmap.width(), canvas.pixmap.height(), scale)?;
            flat.fill(backdrop);
            flat.draw_canvas(&canvas);
            DynamicImage::ImageRgba8(flat.into_image())
                .to_rgb8()
                .write_to(&mut bytes, ImageFormat::Jpeg)?;
        }
    }
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn area(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::from_min_max(pos2(x0, y0), pos2(x1, y1))
    }

    #[test]
    fn scratch_only_covers_the_object() {
        let canvas = Canvas::new(2000, 1000, 2.0).unwrap();
        let scratch = canvas.scratch(area(100.0, 100.0, 110.0, 105.0)).unwrap();
        let (width, height) = scratch.size();
        assert!(width <= 20 + 2 * EDGE_MARGIN as u32, "width = {width}");
        assert!(height <= 10 + 2 * EDGE_MARGIN as u32, "height = {height}");

        // Off-canvas objects get nothing at all
        assert!(canvas.scratch(area(-50.0, -50.0, -40.0, -40.0)).is_none());
    }

    #[test]
    fn scratch_lands_where_it_was_drawn() {
        let mut canvas = Canvas::new(40, 20, 1.0).unwrap();
        let mut scratch = canvas.scratch(area(5.0, 7.0, 35.0, 13.0)).unwrap();
        let path = polyline([pos2(8.0, 10.0), pos2(32.0, 10.0)], false).unwrap();
        scratch.stroke(&path, 6.0, &solid(Color32::BLUE, 1.0));
        canvas.composite(&scratch, 1.0, Composite::SourceOver);

        let image = canvas.into_image();
        assert_eq!(image.get_pixel(20, 9)[3], 255);
        assert_eq!(image.get_pixel(20, 1)[3], 0);
    }

    #[test]
    fn destination_out_removes_alpha() {
        let mut canvas = Canvas::new(4, 4, 1.0).unwrap();
        canvas.fill(Color32::RED);
        let mut scratch = canvas.scratch(area(0.0, 0.0, 4.0, 4.0)).unwrap();
        scratch.fill(&circle(pos2(2.0, 2.0), 4.0).unwrap(), &solid(Color32::BLACK, 1.0));
        canvas.composite(&scratch, 1.0, Composite::DestinationOut);
        assert_eq!(canvas.into_image().get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn translucent_over_transparent_keeps_colour() {
        let mut canvas = Canvas::new(2, 2, 1.0).unwrap();
        let mut scratch = canvas.scratch(area(0.0, 0.0, 2.0, 2.0)).unwrap();
        let corners = [pos2(0.0, 0.0), pos2(2.0, 0.0), pos2(2.0, 2.0), pos2(0.0, 2.0)];
        let square = polyline(corners, true).unwrap();
        scratch.fill(&square, &solid(Color32::from_rgb(10, 20, 30), 1.0));
        canvas.composite(&scratch, 0.5, Composite::SourceOver);

        let pixel = *canvas.into_image().get_pixel(0, 0);
        let close = |a: u8, b: u8| a.abs_diff(b) <= 2;
        assert!(close(pixel[0], 10) && close(pixel[1], 20) && close(pixel[2], 30), "{pixel:?}");
        assert!(close(pixel[3], 128), "{pixel:?}");
    }

    #[test]
    fn coincident_points_make_no_polyline() {
        assert!(polyline([pos2(3.0, 3.0), pos2(3.0, 3.0)], false).is_none());
        assert!(polyline(std::iter::empty(), false).is_none());
    }

    #[test]
    fn dot_halo_has_no_hole() {
        let mut canvas = Canvas::new(40, 40, 1.0).unwrap();
        let mut scratch = canvas.scratch(area(10.0, 10.0, 30.0, 30.0)).unwrap();
        let dot = [Piece::Dot {
            center: pos2(20.0, 20.0),
            width: 2.0,
        }];
        scratch.halo(&dot, 8.0, Color32::RED, 1.0, Vec2::ZERO);
        canvas.composite(&scratch, 1.0, Composite::SourceOver);

        let image = canvas.into_image();
        assert!(image.get_pixel(20, 20)[3] > 0);
        assert!(image.get_pixel(27, 20)[3] > 0);
        assert_eq!(image.get_pixel(38, 38)[3], 0);
    }

    #[test]
    fn render_refuses_oversized_target() {
        let document = Document::new(vec2(200_000.0, 200_000.0), "Layer", None);
        assert!(matches!(
            render_document(&document, 8.0, 64 * 1024 * 1024),
            Err(ExportError::TooLarge { .. })
        ));
    }

    #[test]
    fn export_format_names() {
        assert_eq!(ExportFormat::parse("raster").unwrap(), ExportFormat::Png);
        assert_eq!(ExportFormat::parse("JPG").unwrap(), ExportFormat::Jpeg);
        assert!(ExportFormat::parse("svg").is_err());
    }
}
