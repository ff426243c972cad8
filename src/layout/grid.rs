use crate::geometry::Rect;

/// Outcome of a collision query against the occupancy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionReport {
    pub collided: bool,
    /// Number of stored rectangles the predicate was applied to.
    pub examined: usize,
}

/// Spatial occupancy index over a fixed canvas.
///
/// The canvas is split into `grid_size` x `grid_size` cells; every inserted
/// rectangle is referenced from each cell its extent touches. Insertion is
/// append-only, so a rectangle never changes once stored.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    grid_size: usize,
    cell_width: f32,
    cell_height: f32,
    rects: Vec<Rect>,
    /// Row-major `grid_size * grid_size` cells holding indices into `rects`.
    cells: Vec<Vec<usize>>,
}

impl OccupancyGrid {
    pub fn new(canvas_width: f32, canvas_height: f32, grid_size: usize) -> Self {
        let grid_size = grid_size.max(1);
        Self {
            grid_size,
            cell_width: canvas_width.max(1.0) / grid_size as f32,
            cell_height: canvas_height.max(1.0) / grid_size as f32,
            rects: Vec::new(),
            cells: vec![Vec::new(); grid_size * grid_size],
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Every rectangle registered so far, in insertion order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn add(&mut self, rect: Rect) {
        let idx = self.rects.len();
        self.rects.push(rect);
        let span = self.cell_span(&rect);
        for gx in span.left..=span.right {
            for gy in span.bottom..=span.top {
                self.cells[gy * self.grid_size + gx].push(idx);
            }
        }
    }

    /// Test `rect` against the stored rectangles with the default `overlaps`
    /// predicate.
    pub fn collides(&self, rect: &Rect) -> bool {
        self.test_collision(rect, |existing, candidate| existing.overlaps(candidate))
            .collided
    }

    /// Apply `predicate(existing, rect)` to the rectangles registered in the
    /// cells `rect` spans, stopping at the first match. A rectangle spanning
    /// several of those cells may be examined more than once.
    pub fn test_collision<F>(&self, rect: &Rect, predicate: F) -> CollisionReport
    where
        F: Fn(&Rect, &Rect) -> bool,
    {
        let mut examined = 0;
        let span = self.cell_span(rect);
        for gx in span.left..=span.right {
            for gy in span.bottom..=span.top {
                for &idx in &self.cells[gy * self.grid_size + gx] {
                    examined += 1;
                    if predicate(&self.rects[idx], rect) {
                        return CollisionReport {
                            collided: true,
                            examined,
                        };
                    }
                }
            }
        }
        CollisionReport {
            collided: false,
            examined,
        }
    }

    fn cell_span(&self, rect: &Rect) -> CellSpan {
        CellSpan {
            top: self.cell_coord(rect.top(), self.cell_height),
            left: self.cell_coord(rect.left(), self.cell_width),
            right: self.cell_coord(rect.right(), self.cell_width),
            bottom: self.cell_coord(rect.bottom(), self.cell_height),
        }
    }

    /// Edge coordinate to cell index, clamped to `[0, grid_size - 1]`.
    fn cell_coord(&self, edge: f32, cell: f32) -> usize {
        let raw = (edge / cell).floor();
        if raw.is_nan() || raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.grid_size - 1)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CellSpan {
    top: usize,
    left: usize,
    right: usize,
    bottom: usize,
}
