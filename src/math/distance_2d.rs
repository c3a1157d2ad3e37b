use super::Point2;

/// Projection of a point onto a line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Distance from the query point to the closest point on the segment.
    pub distance: f64,
    /// Clamped projection parameter in `[0, 1]` along `a → b`.
    pub ratio: f64,
    /// The closest point on the segment.
    pub closest: Point2,
}

/// Returns the distance from `p` to the segment `a → b` and the clamped
/// projection ratio of the closest point.
///
/// A degenerate segment (`a == b`) yields the point-to-point distance and ratio 0.
#[must_use]
pub fn distance_to_segment(p: &Point2, a: &Point2, b: &Point2) -> SegmentProjection {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-20 {
        return SegmentProjection {
            distance: (p - a).norm(),
            ratio: 0.0,
            closest: *a,
        };
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest = Point2::new(a.x + t * dx, a.y + t * dy);
    SegmentProjection {
        distance: (p - closest).norm(),
        ratio: t,
        closest,
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn perpendicular_projection() {
        // Point (1, 1) to segment (0,0)→(2,0). Closest at (1,0), dist = 1.
        let proj = distance_to_segment(&p(1.0, 1.0), &p(0.0, 0.0), &p(2.0, 0.0));
        assert!((proj.distance - 1.0).abs() < TOL, "d={}", proj.distance);
        assert!((proj.ratio - 0.5).abs() < TOL, "t={}", proj.ratio);
    }

    #[test]
    fn endpoint_closest_clamps_ratio() {
        let proj = distance_to_segment(&p(-1.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0));
        assert!((proj.distance - 1.0).abs() < TOL);
        assert!(proj.ratio.abs() < TOL);

        let proj = distance_to_segment(&p(5.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0));
        assert!((proj.distance - 3.0).abs() < TOL);
        assert!((proj.ratio - 1.0).abs() < TOL);
    }

    #[test]
    fn point_on_segment() {
        let proj = distance_to_segment(&p(1.5, 0.0), &p(0.0, 0.0), &p(2.0, 0.0));
        assert!(proj.distance.abs() < TOL);
        assert!((proj.ratio - 0.75).abs() < TOL);
    }

    #[test]
    fn degenerate_segment() {
        let proj = distance_to_segment(&p(3.0, 4.0), &p(0.0, 0.0), &p(0.0, 0.0));
        assert!((proj.distance - 5.0).abs() < TOL, "d={}", proj.distance);
        assert!(proj.ratio.abs() < TOL);
    }
}
