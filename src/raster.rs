//! Pixmap-backed canvas: glyph outlines from ttf-parser filled with tiny-skia.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::fonts::{FontData, ScaledFace};
use crate::geometry::Rect;
use crate::theme::Rgba;
use resvg::tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect as SkRect, Stroke,
    Transform,
};
use std::path::Path;
use ttf_parser::OutlineBuilder;

pub struct RasterCanvas {
    pixmap: Pixmap,
    font: FontData,
    background: Rgba,
    /// `background` as the premultiplied pixmap stores it, read back.
    background_pixel: Rgba,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, background: Rgba, font: FontData) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or(Error::InvalidCanvas { width, height })?;
        pixmap.fill(to_color(background));
        let background_pixel = pixmap.pixel(0, 0).map(to_rgba).unwrap_or(background);
        Ok(Self {
            pixmap,
            font,
            background,
            background_pixel,
        })
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| Error::Io(std::io::Error::other(e)))
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

impl Canvas for RasterCanvas {
    type Face = ScaledFace;

    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn load_face(&self, size: f32) -> Result<ScaledFace> {
        Ok(self.font.scaled(size))
    }

    fn measure_text(&self, text: &str, face: &ScaledFace) -> (f32, f32) {
        face.measure(text)
    }

    fn draw_text(&mut self, text: &str, face: &ScaledFace, x: f32, y: f32, anchor: (f32, f32), color: Rgba) {
        let (glyphs, width) = face.layout(text);
        let height = face.line_height();
        let origin_x = x - anchor.0 * width;
        let baseline = y + anchor.1 * height;

        let Some(parsed) = face.font().face() else {
            return;
        };
        let mut builder = PathBuilder::new();
        for glyph in &glyphs {
            let Some(id) = glyph.id else {
                continue;
            };
            let mut pen = GlyphPen {
                builder: &mut builder,
                x: origin_x + glyph.x,
                y: baseline,
                scale: face.scale(),
            };
            parsed.outline_glyph(id, &mut pen);
        }
        let Some(path) = builder.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_color(color));
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn pixel_at(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixmap.pixel(x, y).map(to_rgba)
    }

    fn background_pixel(&self) -> Rgba {
        self.background_pixel
    }

    fn stroke_rect(&mut self, rect: &Rect, color: Rgba) {
        let Some(bounds) = SkRect::from_ltrb(rect.left(), rect.bottom(), rect.right(), rect.top()) else {
            return;
        };
        let path = PathBuilder::from_rect(bounds);
        let mut paint = Paint::default();
        paint.set_color(to_color(color));
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn to_rgba(pixel: PremultipliedColorU8) -> Rgba {
    let pixel = pixel.demultiply();
    Rgba::new(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha())
}

/// Feeds glyph outlines (font units, y up) into a path in canvas units (y down).
struct GlyphPen<'a> {
    builder: &'a mut PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
}

impl GlyphPen<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
