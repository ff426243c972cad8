//! The drawing surface the placement loop renders into.
//!
//! The placement engine never rasterizes anything itself: it measures labels,
//! asks for them to be drawn, and reads pixels back to tighten bounding boxes.
//! `RasterCanvas` (feature `png`) is the real implementation.

use crate::error::Result;
use crate::geometry::Rect;
use crate::theme::Rgba;

pub trait Canvas {
    /// A font resolved at one size.
    type Face: Clone;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Resolve the session font at `size`. Called once per distinct size.
    fn load_face(&self, size: f32) -> Result<Self::Face>;

    /// Rendered `(width, height)` of `text`.
    fn measure_text(&self, text: &str, face: &Self::Face) -> (f32, f32);

    /// Draw `text` so that the point `(x, y)` lands at the fractional
    /// `anchor` of its measured box; `(0.5, 0.5)` centers it.
    fn draw_text(&mut self, text: &str, face: &Self::Face, x: f32, y: f32, anchor: (f32, f32), color: Rgba);

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    fn pixel_at(&self, x: u32, y: u32) -> Option<Rgba>;

    /// What `pixel_at` returns for a pixel nothing has been drawn on. This
    /// may differ from the requested background once the surface has
    /// quantized it (a transparent background loses its color channels).
    fn background_pixel(&self) -> Rgba;

    fn stroke_rect(&mut self, rect: &Rect, color: Rgba);
}
