// Nearest-fit placement over precomputed rings, evaluated by a worker pool.
//
// A producer feeds ring indices in ascending order into a bounded queue and
// stops feeding as soon as any worker reports a hit. Workers scan one ring at
// a time and report either the first free point or exhaustion. The caller
// thread folds the reports through `RingAggregator`, which only commits a hit
// once every smaller ring has reported. On resolution the cancel flag is
// raised and the call does not return until every worker has exited, so the
// grid can be mutated immediately afterwards.

use super::aggregate::{Resolution, RingAggregator, RingOutcome};
use super::grid::OccupancyGrid;
use super::ring::{Ring, RingSet};
use crate::geometry::{Point, Rect};
use log::trace;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

/// Points scanned between two checks of the cancel flag.
const CANCEL_CHECK_INTERVAL: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingHit {
    /// Index of the ring in its `RingSet`.
    pub ring: usize,
    pub radius: f32,
    pub point: Point,
}

pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

pub struct RingSearch<'a> {
    rings: &'a RingSet,
    grid: &'a OccupancyGrid,
    canvas_width: f32,
    canvas_height: f32,
    workers: usize,
}

impl<'a> RingSearch<'a> {
    pub fn new(rings: &'a RingSet, grid: &'a OccupancyGrid, canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            rings,
            grid,
            canvas_width,
            canvas_height,
            workers: default_workers(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Find the smallest ring holding a point where a `width` x `height`
    /// rectangle centered on it fits the canvas and collides with nothing.
    pub fn find(&self, width: f32, height: f32) -> Option<RingHit> {
        let rings = self.rings.rings();
        if rings.is_empty() {
            return None;
        }

        let cancel = AtomicBool::new(false);
        let stop_dispatch = AtomicBool::new(false);
        let (work_tx, work_rx) = mpsc::sync_channel::<usize>(self.workers);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, result_rx) = mpsc::channel::<(usize, RingOutcome)>();
        let mut aggregator = RingAggregator::new(rings.len());

        let resolution = thread::scope(|scope| {
            let cancel = &cancel;
            let stop_dispatch = &stop_dispatch;

            scope.spawn(move || {
                for idx in 0..rings.len() {
                    if cancel.load(Ordering::Acquire) || stop_dispatch.load(Ordering::Acquire) {
                        break;
                    }
                    if work_tx.send(idx).is_err() {
                        break;
                    }
                }
            });

            for _ in 0..self.workers {
                let work_rx = Arc::clone(&work_rx);
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    loop {
                        if cancel.load(Ordering::Acquire) {
                            break;
                        }
                        let next = match work_rx.lock() {
                            Ok(queue) => queue.recv(),
                            Err(_) => break,
                        };
                        let Ok(idx) = next else {
                            break;
                        };
                        let Some(outcome) = self.scan_ring(&rings[idx], width, height, cancel) else {
                            break;
                        };
                        if matches!(outcome, RingOutcome::Hit(_)) {
                            stop_dispatch.store(true, Ordering::Release);
                        }
                        if result_tx.send((idx, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            // Only workers keep the queue and result channel alive from here.
            drop(work_rx);
            drop(result_tx);

            let mut resolution = Resolution::Pending;
            for (idx, outcome) in result_rx.iter() {
                resolution = aggregator.record(idx, outcome);
                if resolution.is_final() {
                    break;
                }
            }
            cancel.store(true, Ordering::Release);
            let drained = result_rx.iter().count();
            trace!(
                "ring search resolved at frontier {} ({} late reports drained)",
                aggregator.frontier(),
                drained
            );
            resolution
        });

        match resolution {
            Resolution::Hit { ring, point } => Some(RingHit {
                ring,
                radius: rings[ring].radius,
                point,
            }),
            Resolution::Exhausted | Resolution::Pending => None,
        }
    }

    /// Single-threaded reference scan: rings strictly in ascending order.
    pub fn find_sequential(&self, width: f32, height: f32) -> Option<RingHit> {
        let never = AtomicBool::new(false);
        self.rings
            .rings()
            .iter()
            .enumerate()
            .find_map(|(idx, ring)| match self.scan_ring(ring, width, height, &never) {
                Some(RingOutcome::Hit(point)) => Some(RingHit {
                    ring: idx,
                    radius: ring.radius,
                    point,
                }),
                _ => None,
            })
    }

    /// Scan one ring's points in order. Returns `None` when cancelled before
    /// the ring was fully decided.
    fn scan_ring(&self, ring: &Ring, width: f32, height: f32, cancel: &AtomicBool) -> Option<RingOutcome> {
        for (i, point) in ring.points.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }
            let candidate = Rect::from_center(point.x, point.y, width, height);
            if !candidate.fits(self.canvas_width, self.canvas_height) {
                continue;
            }
            if !self.grid.collides(&candidate) {
                return Some(RingOutcome::Hit(*point));
            }
        }
        Some(RingOutcome::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn crowded_grid(width: f32, height: f32, count: usize, seed: u64) -> OccupancyGrid {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = OccupancyGrid::new(width, height, 20);
        for _ in 0..count {
            let x = rng.random_range(0.0..width);
            let y = rng.random_range(0.0..height);
            let w = rng.random_range(4.0..30.0);
            let h = rng.random_range(4.0..20.0);
            grid.add(Rect::from_center(x, y, w, h));
        }
        grid
    }

    #[test]
    fn empty_canvas_places_on_first_ring() {
        let grid = OccupancyGrid::new(400.0, 300.0, 30);
        let rings = RingSet::for_canvas(400.0, 300.0, Point::new(200.0, 150.0), 1.0, 5.0, 64);
        let hit = RingSearch::new(&rings, &grid, 400.0, 300.0)
            .find(40.0, 20.0)
            .expect("room on an empty canvas");
        assert_eq!(hit.ring, 0);
        assert_eq!(hit.radius, 1.0);
        assert!((hit.point.x - 201.0).abs() < 1e-4);
        assert!((hit.point.y - 150.0).abs() < 1e-4);
    }

    #[test]
    fn occupied_center_pushes_to_a_larger_ring() {
        let mut grid = OccupancyGrid::new(400.0, 400.0, 40);
        grid.add(Rect::from_center(200.0, 200.0, 60.0, 60.0));
        let rings = RingSet::for_canvas(400.0, 400.0, Point::new(200.0, 200.0), 1.0, 5.0, 128);
        let search = RingSearch::new(&rings, &grid, 400.0, 400.0);
        let hit = search.find(10.0, 10.0).expect("room around the block");
        assert!(hit.radius > 30.0);
        let placed = Rect::from_center(hit.point.x, hit.point.y, 10.0, 10.0);
        assert!(!grid.collides(&placed));
        assert_eq!(Some(hit), search.find_sequential(10.0, 10.0));
    }

    #[test]
    fn radius_is_independent_of_worker_count() {
        let grid = crowded_grid(600.0, 400.0, 250, 7);
        let rings = RingSet::for_canvas(600.0, 400.0, Point::new(300.0, 200.0), 1.0, 5.0, 256);
        for (w, h) in [(12.0, 8.0), (40.0, 18.0), (90.0, 30.0)] {
            let expected = RingSearch::new(&rings, &grid, 600.0, 400.0).find_sequential(w, h);
            for workers in [1, 2, 3, 8, 16] {
                for _ in 0..3 {
                    let got = RingSearch::new(&rings, &grid, 600.0, 400.0)
                        .with_workers(workers)
                        .find(w, h);
                    assert_eq!(
                        got.map(|hit| hit.radius),
                        expected.map(|hit| hit.radius),
                        "{workers} workers, size {w}x{h}"
                    );
                    assert_eq!(got, expected);
                }
            }
        }
    }

    #[test]
    fn full_canvas_reports_no_space() {
        let mut grid = OccupancyGrid::new(100.0, 100.0, 10);
        grid.add(Rect::new(100.0, 0.0, 100.0, 0.0));
        let rings = RingSet::for_canvas(100.0, 100.0, Point::new(50.0, 50.0), 1.0, 5.0, 32);
        for workers in [1, 4] {
            let search = RingSearch::new(&rings, &grid, 100.0, 100.0).with_workers(workers);
            assert_eq!(search.find(5.0, 5.0), None);
        }
    }

    #[test]
    fn oversized_rect_never_fits() {
        let grid = OccupancyGrid::new(100.0, 100.0, 10);
        let rings = RingSet::for_canvas(100.0, 100.0, Point::new(50.0, 50.0), 1.0, 5.0, 32);
        let search = RingSearch::new(&rings, &grid, 100.0, 100.0).with_workers(4);
        assert_eq!(search.find(100.0, 10.0), None);
    }

    #[test]
    fn empty_ring_set_finds_nothing() {
        let grid = OccupancyGrid::new(100.0, 100.0, 10);
        let rings = RingSet::new(Point::new(50.0, 50.0), 10.0, 5.0, 1.0, 32);
        assert_eq!(RingSearch::new(&rings, &grid, 100.0, 100.0).find(1.0, 1.0), None);
    }

    #[test]
    fn worker_count_is_at_least_one() {
        let grid = OccupancyGrid::new(10.0, 10.0, 1);
        let rings = RingSet::new(Point::default(), 1.0, 1.0, 2.0, 4);
        assert_eq!(RingSearch::new(&rings, &grid, 10.0, 10.0).with_workers(0).workers(), 1);
    }
}
