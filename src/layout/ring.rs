use crate::geometry::Point;
use std::f32::consts::TAU;

/// `count` points evenly spaced on the circle of `radius` around `center`,
/// starting at angle 0 and walking counter-clockwise in math orientation.
pub fn ring(center: Point, radius: f32, count: usize) -> Vec<Point> {
    let step = TAU / count.max(1) as f32;
    (0..count)
        .map(|i| {
            let angle = i as f32 * step;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Candidate points for one radius.
#[derive(Debug, Clone)]
pub struct Ring {
    pub radius: f32,
    pub points: Vec<Point>,
}

/// Rings of increasing radius around a fixed focal point, built once per
/// session.
#[derive(Debug, Clone)]
pub struct RingSet {
    center: Point,
    rings: Vec<Ring>,
}

impl RingSet {
    /// Radii run from `start` in increments of `step` while strictly below
    /// `max_radius`.
    pub fn new(center: Point, start: f32, step: f32, max_radius: f32, points_per_ring: usize) -> Self {
        let step = if step > 0.0 { step } else { 1.0 };
        let mut rings = Vec::new();
        let mut idx = 0usize;
        loop {
            let radius = start + step * idx as f32;
            if radius >= max_radius {
                break;
            }
            rings.push(Ring {
                radius,
                points: ring(center, radius, points_per_ring),
            });
            idx += 1;
        }
        Self { center, rings }
    }

    /// Rings covering the whole canvas: up to its diagonal length.
    pub fn for_canvas(
        width: f32,
        height: f32,
        center: Point,
        start: f32,
        step: f32,
        points_per_ring: usize,
    ) -> Self {
        let diagonal = (width * width + height * height).sqrt();
        Self::new(center, start, step, diagonal, points_per_ring)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_points_lie_on_the_circle() {
        let center = Point::new(100.0, 50.0);
        let points = ring(center, 20.0, 64);
        assert_eq!(points.len(), 64);
        for p in &points {
            let d = ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt();
            assert!((d - 20.0).abs() < 1e-3, "distance {d}");
        }
    }

    #[test]
    fn ring_starts_at_angle_zero_and_is_deterministic() {
        let a = ring(Point::new(0.0, 0.0), 10.0, 4);
        let b = ring(Point::new(0.0, 0.0), 10.0, 4);
        assert_eq!(a, b);
        assert!((a[0].x - 10.0).abs() < 1e-5 && a[0].y.abs() < 1e-5);
        assert!(a[1].x.abs() < 1e-5 && (a[1].y - 10.0).abs() < 1e-5);
        assert!((a[2].x + 10.0).abs() < 1e-5);
    }

    #[test]
    fn ring_set_steps_up_to_the_diagonal() {
        let set = RingSet::for_canvas(30.0, 40.0, Point::new(15.0, 20.0), 1.0, 5.0, 8);
        let radii: Vec<f32> = set.rings().iter().map(|r| r.radius).collect();
        assert_eq!(radii, vec![1.0, 6.0, 11.0, 16.0, 21.0, 26.0, 31.0, 36.0, 41.0, 46.0]);
        assert!(set.rings().iter().all(|r| r.points.len() == 8));
    }

    #[test]
    fn empty_ring_set_when_start_exceeds_max() {
        let set = RingSet::new(Point::default(), 10.0, 5.0, 5.0, 8);
        assert!(set.is_empty());
    }
}
