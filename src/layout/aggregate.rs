// Ordered aggregation of per-ring results that arrive out of order.
//
// Rings are indexed by ascending radius. A hit on ring `i` is only final once
// every ring `j < i` has reported, because any of those could still produce a
// hit that takes priority. The frontier is the smallest ring index without a
// final answer; it only moves forward, past exhausted rings.

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingOutcome {
    /// First collision-free, in-canvas point on the ring.
    Hit(Point),
    /// Every point on the ring was rejected.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Some ring at or below the frontier has not reported yet.
    Pending,
    /// The nearest ring with a hit, with every smaller ring exhausted.
    Hit { ring: usize, point: Point },
    /// Every ring reported and none had room.
    Exhausted,
}

impl Resolution {
    pub fn is_final(&self) -> bool {
        !matches!(self, Resolution::Pending)
    }
}

#[derive(Debug, Clone)]
pub struct RingAggregator {
    outcomes: Vec<Option<RingOutcome>>,
    frontier: usize,
}

impl RingAggregator {
    pub fn new(ring_count: usize) -> Self {
        Self {
            outcomes: vec![None; ring_count],
            frontier: 0,
        }
    }

    pub fn ring_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Smallest ring index that is not known to be exhausted.
    pub fn frontier(&self) -> usize {
        self.frontier
    }

    pub fn has_reported(&self, ring: usize) -> bool {
        self.outcomes.get(ring).is_some_and(Option::is_some)
    }

    /// Record the outcome for `ring` and return the resulting resolution.
    /// A ring reports once; later reports for the same ring are ignored, as
    /// are indices outside the ring set.
    pub fn record(&mut self, ring: usize, outcome: RingOutcome) -> Resolution {
        if let Some(slot) = self.outcomes.get_mut(ring)
            && slot.is_none()
        {
            *slot = Some(outcome);
        }
        while let Some(Some(RingOutcome::Exhausted)) = self.outcomes.get(self.frontier) {
            self.frontier += 1;
        }
        self.resolution()
    }

    pub fn resolution(&self) -> Resolution {
        match self.outcomes.get(self.frontier) {
            None => Resolution::Exhausted,
            Some(Some(RingOutcome::Hit(point))) => Resolution::Hit {
                ring: self.frontier,
                point: *point,
            },
            Some(Some(RingOutcome::Exhausted)) | Some(None) => Resolution::Pending,
        }
    }
}
