use super::grid::OccupancyGrid;
use crate::geometry::{Point, Rect};
use rand::Rng;

/// Bounded uniform sampling of the canvas for a free rectangle.
pub struct RandomSearch<'a> {
    grid: &'a OccupancyGrid,
    canvas_width: u32,
    canvas_height: u32,
    max_trials: usize,
}

impl<'a> RandomSearch<'a> {
    pub fn new(grid: &'a OccupancyGrid, canvas_width: u32, canvas_height: u32, max_trials: usize) -> Self {
        Self {
            grid,
            canvas_width,
            canvas_height,
            max_trials,
        }
    }

    /// Sample integer canvas positions until a `width` x `height` rectangle
    /// centered there fits and collides with nothing, or the trial budget runs
    /// out.
    pub fn find<R: Rng + ?Sized>(&self, width: f32, height: f32, rng: &mut R) -> Option<Point> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return None;
        }
        for _ in 0..self.max_trials {
            let x = rng.random_range(0..self.canvas_width) as f32;
            let y = rng.random_range(0..self.canvas_height) as f32;
            let candidate = Rect::from_center(x, y, width, height);
            if !candidate.fits(self.canvas_width as f32, self.canvas_height as f32) {
                continue;
            }
            if !self.grid.collides(&candidate) {
                return Some(Point::new(x, y));
            }
        }
        None
    }
}
