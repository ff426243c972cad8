use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in canvas coordinates.
///
/// `top` is the larger y edge and `bottom` the smaller one, so with the raster's
/// y-down axis `top` sits visually below `bottom`. Callers supply consistent
/// corners; nothing is normalized on construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    top: f32,
    left: f32,
    right: f32,
    bottom: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, right: f32, bottom: f32) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Rectangle of size `width` x `height` centered on `(x, y)`.
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            top: y + height / 2.0,
            left: x - width / 2.0,
            right: x + width / 2.0,
            bottom: y - height / 2.0,
        }
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn x(&self) -> f32 {
        self.left
    }

    pub fn y(&self) -> f32 {
        self.bottom
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Grow the rectangle by `pad` on every side.
    pub fn inflate(&self, pad: f32) -> Self {
        Self {
            top: self.top + pad,
            left: self.left - pad,
            right: self.right + pad,
            bottom: self.bottom - pad,
        }
    }

    /// Strict containment: a rectangle touching the canvas edge does not fit.
    pub fn fits(&self, canvas_width: f32, canvas_height: f32) -> bool {
        self.bottom > 0.0 && self.top < canvas_height && self.left > 0.0 && self.right < canvas_width
    }

    /// Inclusive intersection test; rectangles sharing an edge overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top >= other.bottom
            && self.bottom <= other.top
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x {:.2} y {:.2} w {:.2} h {:.2}]",
            self.x(),
            self.y(),
            self.width(),
            self.height()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_dimensions() {
        let rect = Rect::new(30.0, 10.0, 50.0, 20.0);
        assert_eq!(rect.width(), 40.0);
        assert_eq!(rect.height(), 10.0);
        assert_eq!(rect.center(), Point::new(30.0, 25.0));
    }

    #[test]
    fn from_center_is_symmetric() {
        let rect = Rect::from_center(50.0, 40.0, 20.0, 10.0);
        assert_eq!(rect.left(), 40.0);
        assert_eq!(rect.right(), 60.0);
        assert_eq!(rect.bottom(), 35.0);
        assert_eq!(rect.top(), 45.0);
    }

    #[test]
    fn fits_rejects_touching_edges() {
        assert!(Rect::new(99.0, 1.0, 99.0, 1.0).fits(100.0, 100.0));
        assert!(!Rect::new(99.0, 0.0, 99.0, 1.0).fits(100.0, 100.0));
        assert!(!Rect::new(100.0, 1.0, 99.0, 1.0).fits(100.0, 100.0));
        assert!(!Rect::new(99.0, 1.0, 100.0, 1.0).fits(100.0, 100.0));
        assert!(!Rect::new(99.0, 1.0, 99.0, 0.0).fits(100.0, 100.0));
    }

    #[test]
    fn touching_rectangles_overlap() {
        let a = Rect::new(10.0, 0.0, 10.0, 0.0);
        let b = Rect::new(10.0, 10.0, 20.0, 0.0);
        assert!(a.overlaps(&b));
        let c = Rect::new(10.0, 10.5, 20.0, 0.0);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn overlap_is_symmetric() {
        let rects = [
            Rect::new(10.0, 0.0, 10.0, 0.0),
            Rect::new(15.0, 5.0, 15.0, 5.0),
            Rect::new(40.0, 30.0, 40.0, 30.0),
            Rect::new(100.0, -5.0, 200.0, -10.0),
            Rect::new(3.0, 2.0, 3.0, 2.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn contained_rectangle_overlaps() {
        let outer = Rect::new(100.0, 0.0, 100.0, 0.0);
        let inner = Rect::new(60.0, 40.0, 60.0, 40.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }
}
