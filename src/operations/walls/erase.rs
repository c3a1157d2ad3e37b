use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::{insert_hole_opening, insert_opening, HoleWallOpening, WallOpening};
use crate::math::distance_2d::distance;
use crate::math::{Point2, INTERSECTION_EPSILON};
use crate::operations::query::{EdgeHit, NearestEdge};
use crate::scene::{Element, ElementId, RoomElement, Scene, WallElement};

use super::tiles::{tile_index, WallTile};

#[derive(Debug, Clone, PartialEq)]
pub enum EraseOutcome {
    /// A gap was opened in a room's outer wall.
    RoomOpening { room: ElementId, opening: WallOpening },
    /// A gap was opened in the wall around one of a room's holes.
    HoleOpening {
        room: ElementId,
        opening: HoleWallOpening,
    },
    /// A wall tile, keyed `"{segment}:{edge}:{tile}"`, became transparent.
    WallTile { wall: ElementId, key: String },
}

/// Where on an element's walls the eraser landed.
enum Target {
    Outer(EdgeHit),
    Hole(usize, EdgeHit),
    Wall(usize, EdgeHit),
}

/// Erases a piece of wall under the cursor.
///
/// The top-most room or wall with an edge within its wall thickness of the
/// point is hit. A room gets an opening `size` wide centred on the nearest
/// point; a wall gets the tile under that point marked transparent.
pub struct EraseAt {
    point: Point2,
    size: f64,
}

fn room_target(room: &RoomElement, point: Point2) -> Option<Target> {
    let world = room.world_polygon();
    let query = NearestEdge::new(point);
    let mut best = query.execute(&world.outer).map(Target::Outer);
    for (h, hole) in world.holes.iter().enumerate() {
        if let Some(hit) = query.execute(hole) {
            if best.as_ref().is_none_or(|b| hit.distance < target_hit(b).distance) {
                best = Some(Target::Hole(h, hit));
            }
        }
    }
    best.filter(|t| target_hit(t).distance <= room.wall_thickness)
}

fn wall_target(wall: &WallElement, point: Point2) -> Option<Target> {
    let query = NearestEdge::new(point).open();
    wall.polylines()
        .iter()
        .enumerate()
        .filter_map(|(s, line)| query.execute(line).map(|hit| (s, hit)))
        .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
        .filter(|(_, hit)| hit.distance <= wall.wall_thickness)
        .map(|(s, hit)| Target::Wall(s, hit))
}

fn target_hit(target: &Target) -> &EdgeHit {
    match target {
        Target::Outer(hit) | Target::Hole(_, hit) | Target::Wall(_, hit) => hit,
    }
}

/// Ratio span of width `size` centred on `hit`, clamped to the edge.
fn centred_span(ring: &[Point2], hit: &EdgeHit, size: f64) -> Result<(f64, f64)> {
    let a = ring[hit.edge_index];
    let b = ring[(hit.edge_index + 1) % ring.len()];
    let length = distance(&a, &b);
    let half = 0.5 * size / length;
    let start = (hit.ratio - half).max(0.0);
    let end = (hit.ratio + half).min(1.0);
    if length <= INTERSECTION_EPSILON || end - start <= INTERSECTION_EPSILON {
        return Err(OperationError::InvalidInput("erased span is too small".into()).into());
    }
    Ok((start, end))
}

impl EraseAt {
    /// Creates a new `EraseAt` operation with an eraser `size` wide.
    #[must_use]
    pub fn new(point: Point2, size: f64) -> Self {
        Self { point, size }
    }

    /// Executes the erase.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for a non-positive size or when
    /// no wall is within reach.
    pub fn execute(&self, scene: &mut Scene) -> Result<EraseOutcome> {
        if self.size <= 0.0 || !self.size.is_finite() {
            return Err(OperationError::InvalidInput("eraser size must be positive".into()).into());
        }

        let mut order: Vec<usize> = (0..scene.elements.len()).collect();
        order.sort_by(|&a, &b| {
            let za = scene.elements[a].z_index();
            let zb = scene.elements[b].z_index();
            zb.cmp(&za).then(b.cmp(&a))
        });
        let found = order.into_iter().find_map(|i| {
            let target = match &scene.elements[i] {
                Element::Room(room) => room_target(room, self.point),
                Element::Wall(wall) => wall_target(wall, self.point),
                Element::Token(_) | Element::Annotation(_) => None,
            };
            target.map(|t| (i, t))
        });
        let Some((index, target)) = found else {
            debug!(x = self.point.x, y = self.point.y, "nothing to erase");
            return Err(OperationError::InvalidInput("no wall within reach".into()).into());
        };

        let outcome = match (&mut scene.elements[index], target) {
            (Element::Room(room), Target::Outer(hit)) => {
                let world = room.world_polygon();
                let (start_ratio, end_ratio) = centred_span(&world.outer, &hit, self.size)?;
                let opening = WallOpening {
                    segment_index: hit.edge_index,
                    start_ratio,
                    end_ratio,
                };
                insert_opening(&mut room.wall_openings, opening);
                EraseOutcome::RoomOpening {
                    room: room.id.clone(),
                    opening,
                }
            }
            (Element::Room(room), Target::Hole(hole_index, hit)) => {
                let world = room.world_polygon();
                let (start_ratio, end_ratio) =
                    centred_span(&world.holes[hole_index], &hit, self.size)?;
                let opening = HoleWallOpening {
                    hole_index,
                    segment_index: hit.edge_index,
                    start_ratio,
                    end_ratio,
                };
                insert_hole_opening(&mut room.hole_wall_openings, opening);
                EraseOutcome::HoleOpening {
                    room: room.id.clone(),
                    opening,
                }
            }
            (Element::Wall(wall), Target::Wall(segment, hit)) => {
                let lines = wall.polylines();
                let line = &lines[segment];
                let length = distance(&line[hit.edge_index], &line[hit.edge_index + 1]);
                let key = WallTile {
                    segment,
                    edge: hit.edge_index,
                    tile: tile_index(hit.ratio * length, length, wall.wall_tile_size),
                }
                .to_string();
                wall.transparent_tiles.insert(key.clone());
                EraseOutcome::WallTile {
                    wall: wall.id.clone(),
                    key,
                }
            }
            _ => {
                return Err(OperationError::InvalidInput("erase target changed kind".into()).into())
            }
        };
        debug!(?outcome, "erased");
        Ok(outcome)
    }
}
