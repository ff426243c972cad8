pub mod aggregate;
pub mod grid;
pub mod random;
pub mod ring;
pub mod search;
pub mod sizing;

pub use aggregate::{Resolution, RingAggregator, RingOutcome};
pub use grid::{CollisionReport, OccupancyGrid};
pub use random::RandomSearch;
pub use ring::{Ring, RingSet, ring};
pub use search::{RingHit, RingSearch, default_workers};
pub use sizing::SizeFunction;

use crate::canvas::Canvas;
use crate::config::{Config, PlacementConfig, PlacementMode};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::theme::{Rgba, Theme};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Instant;

/// Input label with its raw weight (usually an occurrence count).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedWord {
    pub text: String,
    pub weight: u32,
}

impl WeightedWord {
    pub fn new(text: impl Into<String>, weight: u32) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }
}

/// A word with the font size derived for it at session setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedWord {
    pub text: String,
    pub weight: u32,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub weight: u32,
    pub font_size: f32,
    /// Anchor point the word was drawn centered on.
    pub position: Point,
    pub color: Rgba,
    /// Coarse box derived from the anchor and measured size, extended by
    /// `descender_slack * height` on the `top` side. The search only checks
    /// the unextended box, so a later word may sit inside that band: placed
    /// `bounds` are pairwise disjoint only when `descender_slack` is 0.
    pub bounds: Rect,
    /// Rectangles registered in the occupancy grid for this word.
    pub occupied: Vec<Rect>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementReport {
    pub placed: Vec<PlacedWord>,
    /// Words that found no free position, in processing order.
    pub skipped: Vec<String>,
    /// Words never attempted because the failure streak ended the loop.
    pub abandoned: usize,
    pub aborted: bool,
}

/// Output of a finished session.
pub struct Rendered<C> {
    pub canvas: C,
    pub report: PlacementReport,
    pub occupancy: OccupancyGrid,
}

/// One rendering session: owns the canvas, occupancy grid, ring set, face
/// cache and random source. Words are placed greedily by descending weight.
pub struct WordCloud<C: Canvas> {
    canvas: C,
    words: Vec<SizedWord>,
    grid: OccupancyGrid,
    rings: RingSet,
    faces: HashMap<u32, C::Face>,
    rng: StdRng,
    theme: Theme,
    placement: PlacementConfig,
    workers: usize,
}

impl<C: Canvas> WordCloud<C> {
    /// Set up a session. `mask` rectangles are registered as occupied before
    /// any word is placed.
    pub fn new<I>(words: I, config: &Config, canvas: C, mask: &[Rect]) -> Result<Self>
    where
        I: IntoIterator<Item = WeightedWord>,
    {
        if config.theme.colors.is_empty() {
            return Err(Error::EmptyPalette);
        }
        let (width, height) = (canvas.width(), canvas.height());
        if width == 0 || height == 0 {
            return Err(Error::InvalidCanvas { width, height });
        }

        let words = size_words(words, config);
        let placement = config.placement.clone();
        let grid = OccupancyGrid::new(
            width as f32,
            height as f32,
            placement.grid_size_for(height),
        );
        config.placement.validate(width, height)?;
        let focus = config
            .canvas
            .focus
            .unwrap_or_else(|| Point::new((width / 2) as f32, (height / 2) as f32));
        let rings = RingSet::for_canvas(
            width as f32,
            height as f32,
            focus,
            placement.radius_start,
            placement.radius_step,
            placement.ring_points,
        );
        let rng = match placement.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let workers = placement.workers.unwrap_or_else(default_workers).max(1);

        let mut cloud = Self {
            canvas,
            words,
            grid,
            rings,
            faces: HashMap::new(),
            rng,
            theme: config.theme.clone(),
            placement,
            workers,
        };
        for rect in mask {
            cloud.register(*rect);
        }
        debug!(
            "session ready: {} words, {} rings, {} mask rects, {} workers",
            cloud.words.len(),
            cloud.rings.len(),
            mask.len(),
            cloud.workers
        );
        Ok(cloud)
    }

    /// Words in placement order with their derived font sizes.
    pub fn words(&self) -> &[SizedWord] {
        &self.words
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Place every word, stopping early once more than `max_failures`
    /// consecutive words could not be placed.
    pub fn draw(mut self) -> Result<Rendered<C>> {
        let started = Instant::now();
        let words = std::mem::take(&mut self.words);
        let mut report = PlacementReport::default();
        let mut misses = 0usize;

        for (idx, word) in words.iter().enumerate() {
            match self.place(word)? {
                Some(placed) => {
                    misses = 0;
                    debug!(
                        "placed {:?} (size {:.1}) at ({:.1}, {:.1})",
                        placed.text, placed.font_size, placed.position.x, placed.position.y
                    );
                    report.placed.push(placed);
                }
                None => {
                    misses += 1;
                    debug!(
                        "({}/{}) could not place {:?}",
                        idx + 1,
                        words.len(),
                        word.text
                    );
                    report.skipped.push(word.text.clone());
                    if misses > self.placement.max_failures {
                        report.aborted = true;
                        report.abandoned = words.len() - idx - 1;
                        warn!(
                            "{} consecutive misses; canvas saturated, abandoning {} words",
                            misses, report.abandoned
                        );
                        break;
                    }
                }
            }
        }

        info!(
            "placed {} of {} words in {:.2?}",
            report.placed.len(),
            words.len(),
            started.elapsed()
        );
        Ok(Rendered {
            canvas: self.canvas,
            report,
            occupancy: self.grid,
        })
    }

    fn place(&mut self, word: &SizedWord) -> Result<Option<PlacedWord>> {
        let color = self.theme.colors[self.rng.random_range(0..self.theme.colors.len())];
        let face = self.face_for(word.font_size)?;
        let (mut width, mut height) = self.canvas.measure_text(&word.text, &face);
        width += self.placement.padding;
        height += self.placement.padding;

        let Some(position) = self.next_pos(width, height) else {
            return Ok(None);
        };
        let (x, y) = (position.x, position.y);
        self.canvas
            .draw_text(&word.text, &face, x, y, (0.5, 0.5), color);

        let bounds = Rect::new(
            y + height / 2.0 + self.placement.descender_slack * height,
            x - width / 2.0,
            x + width / 2.0,
            (y - height / 2.0).max(0.0),
        );
        let occupied = if height > self.placement.precise_threshold {
            self.precise_boxes(&bounds)
        } else {
            vec![bounds]
        };
        for rect in &occupied {
            self.register(*rect);
        }

        Ok(Some(PlacedWord {
            text: word.text.clone(),
            weight: word.weight,
            font_size: word.font_size,
            position,
            color,
            bounds,
            occupied,
        }))
    }

    /// Free position for a `width` x `height` box using the configured
    /// strategy. Every ring worker has exited by the time this returns.
    fn next_pos(&mut self, width: f32, height: f32) -> Option<Point> {
        match self.placement.mode {
            PlacementMode::Ring => RingSearch::new(
                &self.rings,
                &self.grid,
                self.canvas.width() as f32,
                self.canvas.height() as f32,
            )
            .with_workers(self.workers)
            .find(width, height)
            .map(|hit| hit.point),
            PlacementMode::Random => RandomSearch::new(
                &self.grid,
                self.canvas.width(),
                self.canvas.height(),
                self.placement.random_trials,
            )
            .find(width, height, &mut self.rng),
        }
    }

    /// Tile the box and keep only tiles whose sampled pixel differs from an
    /// untouched canvas pixel, each grown by the tile margin.
    fn precise_boxes(&self, bounds: &Rect) -> Vec<Rect> {
        let step = self.placement.tile_size.max(1) as i64;
        let margin = self.placement.tile_margin;
        let background = self.canvas.background_pixel();
        let left = bounds.left().floor().max(0.0) as i64;
        let right = bounds.right() as i64;
        let bottom = bounds.bottom().max(0.0) as i64;
        let top = bounds.top() as i64;

        let mut boxes = Vec::new();
        let mut i = left;
        while i < right {
            let mut j = bottom;
            while j < top {
                let inked = self
                    .canvas
                    .pixel_at(i as u32, j as u32)
                    .is_some_and(|pixel| pixel != background);
                if inked {
                    boxes.push(Rect::new(
                        (j + step) as f32 + margin,
                        i as f32 - margin,
                        (i + step) as f32 + margin,
                        j as f32 - margin,
                    ));
                }
                j += step;
            }
            i += step;
        }
        boxes
    }

    fn face_for(&mut self, size: f32) -> Result<C::Face> {
        let key = size.to_bits();
        if let Some(face) = self.faces.get(&key) {
            return Ok(face.clone());
        }
        let face = self.canvas.load_face(size)?;
        self.faces.insert(key, face.clone());
        Ok(face)
    }

    fn register(&mut self, rect: Rect) {
        self.grid.add(rect);
        if self.placement.debug {
            self.canvas.stroke_rect(&rect, self.theme.debug_stroke);
        }
    }
}

/// Sort by descending weight (stable, so ties keep input order) and derive
/// each word's font size from the heaviest weight in the set.
fn size_words<I>(words: I, config: &Config) -> Vec<SizedWord>
where
    I: IntoIterator<Item = WeightedWord>,
{
    let mut words: Vec<WeightedWord> = words.into_iter().collect();
    words.sort_by(|a, b| b.weight.cmp(&a.weight));
    let max_weight = words.first().map(|w| w.weight).unwrap_or(0);
    let func = config.placement.size_function;
    words
        .into_iter()
        .map(|word| SizedWord {
            font_size: func.font_size(
                word.weight,
                max_weight,
                config.font.max_size,
                config.font.min_size,
            ),
            text: word.text,
            weight: word.weight,
        })
        .collect()
}
