use serde::{Deserialize, Serialize};

use crate::math::Point2;
use crate::scene::serde_points;

/// An axis-aligned bounding box (also used for cut and fill rectangles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    #[serde(with = "serde_points::point")]
    pub min: Point2,
    /// Maximum corner of the bounding box.
    #[serde(with = "serde_points::point")]
    pub max: Point2,
}

impl Aabb {
    /// Creates a box from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box containing all points, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for pt in &points[1..] {
            min.x = min.x.min(pt.x);
            min.y = min.y.min(pt.y);
            max.x = max.x.max(pt.x);
            max.y = max.y.max(pt.y);
        }
        Some(Self { min, max })
    }

    /// Returns the box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Closed-interval overlap test; boxes that share an edge intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Returns `true` if `p` lies strictly inside the box.
    #[must_use]
    pub fn contains_strict(&self, p: &Point2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Returns `true` if the box encloses no area or has non-finite bounds.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let finite = self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite();
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn corners_are_normalized() {
        let b = Aabb::from_corners(p(10.0, -5.0), p(0.0, 5.0));
        assert_eq!(b.min, p(0.0, -5.0));
        assert_eq!(b.max, p(10.0, 5.0));
    }

    #[test]
    fn from_points_bounds_everything() {
        let b = Aabb::from_points(&[p(1.0, 2.0), p(-3.0, 4.0), p(0.0, -1.0)]).unwrap();
        assert_eq!(b.min, p(-3.0, -1.0));
        assert_eq!(b.max, p(1.0, 4.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn expanded_boxes_touching_walls_intersect() {
        let a = Aabb::from_corners(p(0.0, 0.0), p(100.0, 100.0));
        let b = Aabb::from_corners(p(105.0, 0.0), p(200.0, 100.0));
        assert!(!a.intersects(&b));
        assert!(a.expanded(10.0).intersects(&b.expanded(10.0)));
    }

    #[test]
    fn degenerate_boxes() {
        assert!(Aabb::from_corners(p(0.0, 0.0), p(0.0, 10.0)).is_degenerate());
        assert!(!Aabb::from_corners(p(0.0, 0.0), p(1.0, 10.0)).is_degenerate());
        assert!(Aabb::from_corners(p(0.0, 0.0), p(f64::NAN, 10.0)).is_degenerate());
    }
}
