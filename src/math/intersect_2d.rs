use super::{lerp, Point2, INTERSECTION_EPSILON, TOLERANCE};
use crate::geometry::Aabb;

/// A crossing between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCrossing {
    /// The intersection point.
    pub point: Point2,
    /// Parameter along the first segment, strictly inside `(0, 1)`.
    pub t: f64,
    /// Parameter along the second segment, strictly inside `(0, 1)`.
    pub u: f64,
}

/// Intersection of segments `p1 → p2` and `p3 → p4`.
///
/// Only crossings strictly inside both open intervals are reported; touching at
/// an endpoint is not a crossing. Parallel and coincident segments return `None`
/// instead of an infinite set of points.
#[must_use]
pub fn segment_intersection(
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
    p4: &Point2,
) -> Option<SegmentCrossing> {
    let da = p2 - p1;
    let db = p4 - p3;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = p3.x - p1.x;
    let dy = p3.y - p1.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    let eps = INTERSECTION_EPSILON;
    if t > eps && t < 1.0 - eps && u > eps && u < 1.0 - eps {
        Some(SegmentCrossing {
            point: lerp(p1, p2, t),
            t,
            u,
        })
    } else {
        None
    }
}

/// Clips the segment `a → b` against an axis-aligned rectangle.
///
/// Slab (Liang–Barsky) clip against the four half-planes. Returns the parameter
/// interval `(t0, t1)` with `0 ≤ t0 < t1 ≤ 1` that lies inside the rectangle, or
/// `None` if the segment misses it or only grazes a single point.
#[must_use]
pub fn clip_segment_to_rect(a: &Point2, b: &Point2, rect: &Aabb) -> Option<(f64, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let slabs = [
        (-dx, a.x - rect.min.x),
        (dx, rect.max.x - a.x),
        (-dy, a.y - rect.min.y),
        (dy, rect.max.y - a.y),
    ];

    for (p, q) in slabs {
        if p.abs() < TOLERANCE {
            // Parallel to this slab: reject if outside it.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    if t1 - t0 > INTERSECTION_EPSILON {
        Some((t0, t1))
    } else {
        None
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
    fn crossing_segments() {
        let hit = segment_intersection(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0))
            .unwrap();
        assert!((hit.point.x - 1.0).abs() < 1e-9);
        assert!((hit.point.y - 1.0).abs() < 1e-9);
        assert!((hit.t - 0.5).abs() < 1e-9);
        assert!((hit.u - 0.5).abs() < 1e-9);
    }

    #[test]
    fn endpoint_touch_is_not_a_crossing() {
        let hit = segment_intersection(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0));
        assert!(hit.is_none());

        // T-junction: end of the second segment lies on the first.
        let hit = segment_intersection(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 1.0), &p(1.0, 0.0));
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_and_coincident_return_none() {
        let parallel =
            segment_intersection(&p(0.0, 0.0), &p(2.0, 0.0), &p(0.0, 1.0), &p(2.0, 1.0));
        assert!(parallel.is_none());

        let coincident =
            segment_intersection(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 0.0), &p(3.0, 0.0));
        assert!(coincident.is_none());
    }

    #[test]
    fn disjoint_segments() {
        let hit = segment_intersection(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, -1.0), &p(2.0, 1.0));
        assert!(hit.is_none());
    }

    #[test]
    fn clip_through_rectangle() {
        let rect = Aabb::from_corners(p(60.0, -10.0), p(90.0, 110.0));
        let (t0, t1) = clip_segment_to_rect(&p(0.0, 50.0), &p(200.0, 50.0), &rect).unwrap();
        assert!((t0 - 0.3).abs() < 1e-9, "t0={t0}");
        assert!((t1 - 0.45).abs() < 1e-9, "t1={t1}");
    }

    #[test]
    fn clip_segment_starting_inside() {
        let rect = Aabb::from_corners(p(0.0, 0.0), p(10.0, 10.0));
        let (t0, t1) = clip_segment_to_rect(&p(5.0, 5.0), &p(15.0, 5.0), &rect).unwrap();
        assert!(t0.abs() < 1e-9);
        assert!((t1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn clip_misses_rectangle() {
        let rect = Aabb::from_corners(p(0.0, 0.0), p(10.0, 10.0));
        assert!(clip_segment_to_rect(&p(-5.0, 20.0), &p(20.0, 20.0), &rect).is_none());
        assert!(clip_segment_to_rect(&p(-5.0, -5.0), &p(-1.0, 20.0), &rect).is_none());
    }

    #[test]
    fn clip_grazing_corner_is_rejected() {
        let rect = Aabb::from_corners(p(0.0, 0.0), p(10.0, 10.0));
        assert!(clip_segment_to_rect(&p(-5.0, 5.0), &p(5.0, -5.0), &rect).is_none());
    }
}
