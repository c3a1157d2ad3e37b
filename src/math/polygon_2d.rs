use super::{Point2, TOLERANCE};

/// Ray-casting parity test.
///
/// Casts a ray towards +x and counts edge crossings. Callers must supply a
/// simple ring; the result on self-intersecting input follows even-odd parity.
#[must_use]
pub fn point_in_polygon(point: &Point2, ring: &[Point2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        if (yi > point.y) != (yj > point.y) && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(ring: &[Point2]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
    }
    sum * 0.5
}

/// Area enclosed by an outer ring minus its holes.
#[must_use]
pub fn area_with_holes(outer: &[Point2], holes: &[Vec<Point2>]) -> f64 {
    let hole_area: f64 = holes.iter().map(|h| signed_area(h).abs()).sum();
    signed_area(outer).abs() - hole_area
}

/// Rotates points about `center` by `degrees` (counter-clockwise in a y-up frame).
#[must_use]
pub fn rotate_points(points: &[Point2], center: &Point2, degrees: f64) -> Vec<Point2> {
    if degrees.abs() < TOLERANCE {
        return points.to_vec();
    }
    let (s, c) = degrees.to_radians().sin_cos();
    points
        .iter()
        .map(|p| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            Point2::new(center.x + dx * c - dy * s, center.y + dx * s + dy * c)
        })
        .collect()
}

/// Removes consecutive duplicate vertices, including the implicit closing pair.
#[must_use]
pub fn dedup_ring(ring: &[Point2], tol: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(ring.len());
    for pt in ring {
        if out.last().is_some_and(|last| (last - pt).norm() <= tol) {
            continue;
        }
        out.push(*pt);
    }
    while out.len() > 1 && out.first().zip(out.last()).is_some_and(|(a, b)| (a - b).norm() <= tol)
    {
        out.pop();
    }
    out
}

/// Returns `true` if every coordinate in the ring is finite.
#[must_use]
pub fn is_finite_ring(ring: &[Point2]) -> bool {
    ring.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]
    }

    #[test]
    fn point_inside_and_outside() {
        assert!(point_in_polygon(&p(5.0, 5.0), &square()));
        assert!(!point_in_polygon(&p(15.0, 5.0), &square()));
        assert!(!point_in_polygon(&p(5.0, -1.0), &square()));
    }

    #[test]
    fn point_in_concave_ring() {
        // L-shape: the notch at the top right is outside.
        let ring = vec![
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 5.0),
            p(5.0, 5.0),
            p(5.0, 10.0),
            p(0.0, 10.0),
        ];
        assert!(point_in_polygon(&p(2.0, 8.0), &ring));
        assert!(!point_in_polygon(&p(8.0, 8.0), &ring));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        assert!(!point_in_polygon(&p(0.0, 0.0), &[p(0.0, 0.0), p(1.0, 1.0)]));
    }

    #[test]
    fn signed_area_orientation() {
        assert!((signed_area(&square()) - 100.0).abs() < TOLERANCE);
        let mut cw = square();
        cw.reverse();
        assert!((signed_area(&cw) + 100.0).abs() < TOLERANCE);
        assert!(signed_area(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn area_subtracts_holes() {
        let hole = vec![p(2.0, 2.0), p(4.0, 2.0), p(4.0, 4.0), p(2.0, 4.0)];
        let area = area_with_holes(&square(), &[hole]);
        assert!((area - 96.0).abs() < TOLERANCE);
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = rotate_points(&[p(10.0, 0.0)], &p(0.0, 0.0), 90.0);
        assert!(rotated[0].x.abs() < 1e-9);
        assert!((rotated[0].y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn dedup_removes_closing_duplicate() {
        let ring = vec![p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 0.0)];
        let out = dedup_ring(&ring, 1e-9);
        assert_eq!(out.len(), 3);
    }
}
