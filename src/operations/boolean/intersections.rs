use crate::math::intersect_2d::segment_intersection;
use crate::math::Point2;

/// Points to splice into one edge, as `(t, point)` pairs.
type EdgeInsertions = Vec<(f64, Point2)>;

/// Inserts a vertex wherever two non-adjacent edges of a closed ring cross.
///
/// Opening bookkeeping is edge-index + ratio based, so every crossing left by
/// a boolean op has to become an explicit vertex. Insertions on one edge are
/// ordered by their parameter along it.
#[must_use]
pub fn add_intersection_vertices(ring: &[Point2]) -> Vec<Point2> {
    let n = ring.len();
    if n < 4 {
        return ring.to_vec();
    }

    let mut insertions: Vec<EdgeInsertions> = vec![Vec::new(); n];
    for i in 0..n {
        let a0 = ring[i];
        let a1 = ring[(i + 1) % n];
        for j in (i + 2)..n {
            // Edges 0 and n-1 share the closing vertex.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = ring[j];
            let b1 = ring[(j + 1) % n];
            if let Some(hit) = segment_intersection(&a0, &a1, &b0, &b1) {
                insertions[i].push((hit.t, hit.point));
                insertions[j].push((hit.u, hit.point));
            }
        }
    }

    splice(ring, insertions, n)
}

/// Inserts a vertex wherever an edge of one open polyline crosses an edge of
/// another. Crossings within a single polyline are left alone.
#[must_use]
pub fn add_cross_segment_vertices(polylines: &[Vec<Point2>]) -> Vec<Vec<Point2>> {
    polylines
        .iter()
        .enumerate()
        .map(|(a, line)| {
            let edge_count = line.len().saturating_sub(1);
            let mut insertions: Vec<EdgeInsertions> = vec![Vec::new(); edge_count];
            for (e, pair) in line.windows(2).enumerate() {
                for (b, other) in polylines.iter().enumerate() {
                    if a == b {
                        continue;
                    }
                    for other_pair in other.windows(2) {
                        if let Some(hit) =
                            segment_intersection(&pair[0], &pair[1], &other_pair[0], &other_pair[1])
                        {
                            insertions[e].push((hit.t, hit.point));
                        }
                    }
                }
            }
            splice(line, insertions, edge_count)
        })
        .collect()
}

/// Rebuilds a vertex list with each edge's insertions placed after its start
/// vertex. For open polylines the final vertex is appended after the last edge.
fn splice(points: &[Point2], mut insertions: Vec<EdgeInsertions>, edge_count: usize) -> Vec<Point2> {
    let extra: usize = insertions.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(points.len() + extra);

    for (i, pt) in points.iter().enumerate() {
        out.push(*pt);
        if i >= edge_count {
            continue;
        }
        let edge = &mut insertions[i];
        edge.sort_by(|a, b| a.0.total_cmp(&b.0));
        edge.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-9);
        out.extend(edge.iter().map(|(_, p)| *p));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn simple_ring_is_unchanged() {
        let ring = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        assert_eq!(add_intersection_vertices(&ring), ring);
    }

    #[test]
    fn bowtie_gets_crossing_vertex_on_both_edges() {
        // Edges 0→1 and 2→3 cross at (5, 5).
        let ring = vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)];
        let out = add_intersection_vertices(&ring);
        assert_eq!(out.len(), 6);
        assert_eq!(out[1], p(5.0, 5.0));
        assert_eq!(out[4], p(5.0, 5.0));
    }

    #[test]
    fn multiple_crossings_sorted_along_edge() {
        // A long edge crossed by a zig-zag.
        let ring = vec![
            p(0.0, 0.0),
            p(30.0, 0.0),
            p(30.0, 10.0),
            p(20.0, -10.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
        ];
        let out = add_intersection_vertices(&ring);
        let on_first_edge: Vec<f64> = out[1..]
            .iter()
            .take_while(|pt| pt.y.abs() < 1e-9 && pt.x < 30.0)
            .map(|pt| pt.x)
            .collect();
        assert_eq!(on_first_edge.len(), 2);
        assert!(on_first_edge[0] < on_first_edge[1]);
    }

    #[test]
    fn crossing_polylines_split_each_other() {
        let lines = vec![
            vec![p(0.0, 0.0), p(10.0, 0.0)],
            vec![p(5.0, -5.0), p(5.0, 5.0)],
        ];
        let out = add_cross_segment_vertices(&lines);
        assert_eq!(out[0], vec![p(0.0, 0.0), p(5.0, 0.0), p(10.0, 0.0)]);
        assert_eq!(out[1], vec![p(5.0, -5.0), p(5.0, 0.0), p(5.0, 5.0)]);
    }

    #[test]
    fn self_crossing_polyline_is_left_alone() {
        let lines = vec![vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)]];
        assert_eq!(add_cross_segment_vertices(&lines), lines);
    }
}
