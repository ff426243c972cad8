//! Forbidden regions derived from a mask image.
//!
//! The image is scaled uniformly to fit the canvas and centered; the
//! letterbox margins are forbidden outright, and inside the image every
//! sampled tile whose pixel equals the exclude color becomes a rectangle.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::theme::Rgba;
use resvg::tiny_skia::{ColorU8, Pixmap};
use std::path::Path;

const SAMPLE_STEP: u32 = 3;

pub fn load_mask(path: &Path, width: u32, height: u32, exclude: Rgba) -> Result<Vec<Rect>> {
    let image = Pixmap::load_png(path).map_err(|e| Error::Mask {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(mask_boxes(&image, width, height, exclude))
}

pub fn mask_boxes(image: &Pixmap, width: u32, height: u32, exclude: Rgba) -> Vec<Rect> {
    let (width, height) = (width as f32, height as f32);
    let (img_w, img_h) = (image.width(), image.height());
    let ratio = (width / img_w as f32).min(height / img_h as f32);

    let mut boxes = Vec::new();
    let mut x_offset = 0.0;
    let mut y_offset = 0.0;
    if ratio * (img_w as f32) < width {
        x_offset = (width - ratio * img_w as f32) / 2.0;
        boxes.push(Rect::new(height, 0.0, x_offset, 0.0));
        boxes.push(Rect::new(height, width - x_offset, width, 0.0));
    }
    if ratio * (img_h as f32) < height {
        y_offset = (height - ratio * img_h as f32) / 2.0;
        boxes.push(Rect::new(y_offset, 0.0, width, 0.0));
        boxes.push(Rect::new(height, 0.0, width, height - y_offset));
    }

    // Compare premultiplied, so every fully transparent pixel matches a
    // transparent exclude color regardless of its channels.
    let target = ColorU8::from_rgba(exclude.r, exclude.g, exclude.b, exclude.a).premultiply();
    for i in (0..img_w).step_by(SAMPLE_STEP as usize) {
        for j in (0..img_h).step_by(SAMPLE_STEP as usize) {
            if image.pixel(i, j) != Some(target) {
                continue;
            }
            boxes.push(Rect::new(
                ((j + SAMPLE_STEP) as f32 * ratio + y_offset).min(height),
                i as f32 * ratio + x_offset,
                ((i + SAMPLE_STEP) as f32 * ratio + x_offset).min(width),
                j as f32 * ratio + y_offset,
            ));
        }
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::{Color, PremultipliedColorU8};

    fn opaque_image(width: u32, height: u32) -> Pixmap {
        let mut image = Pixmap::new(width, height).unwrap();
        image.fill(Color::WHITE);
        image
    }

    #[test]
    fn fully_opaque_square_mask_forbids_nothing() {
        let image = opaque_image(30, 30);
        assert!(mask_boxes(&image, 90, 90, Rgba::TRANSPARENT).is_empty());
    }

    #[test]
    fn wide_canvas_gets_side_bands() {
        let image = opaque_image(30, 30);
        let boxes = mask_boxes(&image, 60, 30, Rgba::TRANSPARENT);
        assert_eq!(
            boxes,
            vec![
                Rect::new(30.0, 0.0, 15.0, 0.0),
                Rect::new(30.0, 45.0, 60.0, 0.0),
            ]
        );
    }

    #[test]
    fn excluded_pixels_become_scaled_tiles() {
        let mut image = opaque_image(6, 6);
        let clear = PremultipliedColorU8::from_rgba(0, 0, 0, 0).unwrap();
        image.pixels_mut()[0] = clear;
        let boxes = mask_boxes(&image, 12, 12, Rgba::TRANSPARENT);
        assert_eq!(boxes, vec![Rect::new(6.0, 0.0, 6.0, 0.0)]);
    }

    #[test]
    fn tiles_are_clamped_to_the_canvas() {
        let mut image = Pixmap::new(4, 4).unwrap();
        image.fill(Color::BLACK);
        let boxes = mask_boxes(&image, 4, 4, Rgba::BLACK);
        assert_eq!(boxes.len(), 4);
        assert!(boxes.iter().all(|b| b.right() <= 4.0 && b.top() <= 4.0));
    }

    #[test]
    fn unreadable_mask_is_reported_with_its_path() {
        let err = load_mask(Path::new("/nonexistent/mask.png"), 10, 10, Rgba::BLACK).unwrap_err();
        assert!(matches!(err, Error::Mask { .. }));
    }
}
