use tracing::warn;

use crate::geometry::{
    insert_hole_opening, insert_opening, HoleWallOpening, Polygon, WallOpening,
};
use crate::math::distance_2d::distance_to_segment;
use crate::math::{Point2, INTERSECTION_EPSILON};
use crate::scene::RoomElement;

/// Openings carried over onto one output polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReprojectedOpenings {
    pub wall_openings: Vec<WallOpening>,
    pub hole_wall_openings: Vec<HoleWallOpening>,
}

/// Where a gap landed: the target polygon, the ring (`None` = outer) and edge.
struct Landing {
    target: usize,
    hole: Option<usize>,
    segment: usize,
    start: f64,
    end: f64,
}

fn match_on_ring(ring: &[Point2], a: &Point2, b: &Point2, tolerance: f64) -> Option<(usize, f64, f64)> {
    let n = ring.len();
    for i in 0..n {
        let e0 = ring[i];
        let e1 = ring[(i + 1) % n];
        let pa = distance_to_segment(a, &e0, &e1);
        let pb = distance_to_segment(b, &e0, &e1);
        if pa.distance <= tolerance && pb.distance <= tolerance {
            let start = pa.ratio.min(pb.ratio);
            let end = pa.ratio.max(pb.ratio);
            if end - start > INTERSECTION_EPSILON {
                return Some((i, start, end));
            }
        }
    }
    None
}

fn locate(targets: &[Polygon], a: &Point2, b: &Point2, tolerance: f64) -> Option<Landing> {
    for (t, polygon) in targets.iter().enumerate() {
        if let Some((segment, start, end)) = match_on_ring(&polygon.outer, a, b, tolerance) {
            return Some(Landing {
                target: t,
                hole: None,
                segment,
                start,
                end,
            });
        }
        for (h, hole) in polygon.holes.iter().enumerate() {
            if let Some((segment, start, end)) = match_on_ring(hole, a, b, tolerance) {
                return Some(Landing {
                    target: t,
                    hole: Some(h),
                    segment,
                    start,
                    end,
                });
            }
        }
    }
    None
}

/// Carries the openings of `sources` onto the boolean-op output `targets`.
///
/// Each opening becomes two world points on its source room (rotation baked
/// in). The first target edge whose projection lies within `tolerance` of
/// both points receives the opening, with ratios recomputed against that
/// edge. Openings that land nowhere are dropped; their count is returned.
#[must_use]
pub fn reproject_openings(
    sources: &[&RoomElement],
    targets: &[Polygon],
    tolerance: f64,
) -> (Vec<ReprojectedOpenings>, usize) {
    let mut out = vec![ReprojectedOpenings::default(); targets.len()];
    let mut dropped = 0;

    for room in sources {
        let world = room.world_polygon();
        let gaps = room
            .wall_openings
            .iter()
            .filter_map(|o| o.world_points(&world.outer))
            .chain(
                room.hole_wall_openings
                    .iter()
                    .filter_map(|o| o.world_points(&world.holes)),
            );

        for (a, b) in gaps {
            let Some(landing) = locate(targets, &a, &b, tolerance) else {
                dropped += 1;
                warn!(
                    room = %room.id,
                    start = ?[a.x, a.y],
                    end = ?[b.x, b.y],
                    "dropping opening with no matching edge"
                );
                continue;
            };
            let slot = &mut out[landing.target];
            match landing.hole {
                None => insert_opening(
                    &mut slot.wall_openings,
                    WallOpening {
                        segment_index: landing.segment,
                        start_ratio: landing.start,
                        end_ratio: landing.end,
                    },
                ),
                Some(hole_index) => insert_hole_opening(
                    &mut slot.hole_wall_openings,
                    HoleWallOpening {
                        hole_index,
                        segment_index: landing.segment,
                        start_ratio: landing.start,
                        end_ratio: landing.end,
                    },
                ),
            }
        }
    }

    (out, dropped)
}
