use crate::math::distance_2d::distance_to_segment;
use crate::math::Point2;

/// The edge of a ring or polyline closest to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    /// Index of the edge's start vertex.
    pub edge_index: usize,
    pub distance: f64,
    /// Projection parameter of the closest point along the edge.
    pub ratio: f64,
    pub point: Point2,
}

/// Finds the edge nearest to a point.
///
/// Rings are closed by default, so the last vertex connects back to the
/// first; call [`NearestEdge::open`] for wall polylines. Ties go to the
/// lower edge index.
pub struct NearestEdge {
    point: Point2,
    closed: bool,
}

impl NearestEdge {
    /// Creates a new `NearestEdge` query against closed rings.
    #[must_use]
    pub fn new(point: Point2) -> Self {
        Self {
            point,
            closed: true,
        }
    }

    /// Treats the vertex list as an open polyline.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.closed = false;
        self
    }

    /// Executes the query, returning `None` when there is no edge.
    #[must_use]
    pub fn execute(&self, vertices: &[Point2]) -> Option<EdgeHit> {
        let n = vertices.len();
        if n < 2 {
            return None;
        }
        let edge_count = if self.closed && n >= 3 { n } else { n - 1 };

        let mut best: Option<EdgeHit> = None;
        for i in 0..edge_count {
            let a = &vertices[i];
            let b = &vertices[(i + 1) % n];
            let proj = distance_to_segment(&self.point, a, b);
            if best.is_none_or(|hit| proj.distance < hit.distance) {
                best = Some(EdgeHit {
                    edge_index: i,
                    distance: proj.distance,
                    ratio: proj.ratio,
                    point: proj.closest,
                });
            }
        }
        best
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ]
    }

    #[test]
    fn finds_closing_edge_of_ring() {
        let hit = NearestEdge::new(Point2::new(-3.0, 25.0))
            .execute(&square())
            .unwrap();
        assert_eq!(hit.edge_index, 3);
        assert!((hit.distance - 3.0).abs() < 1e-12);
        assert!((hit.ratio - 0.75).abs() < 1e-12);
    }

    #[test]
    fn open_polyline_skips_closing_edge() {
        let hit = NearestEdge::new(Point2::new(-3.0, 25.0))
            .open()
            .execute(&square())
            .unwrap();
        assert_eq!(hit.edge_index, 0);
    }

    #[test]
    fn ratio_and_point_on_edge() {
        let hit = NearestEdge::new(Point2::new(30.0, 4.0))
            .execute(&square())
            .unwrap();
        assert_eq!(hit.edge_index, 0);
        assert!((hit.ratio - 0.3).abs() < 1e-12);
        assert_eq!(hit.point, Point2::new(30.0, 0.0));
    }

    #[test]
    fn too_few_vertices_has_no_edge() {
        assert!(NearestEdge::new(Point2::origin()).execute(&[Point2::origin()]).is_none());
    }
}
