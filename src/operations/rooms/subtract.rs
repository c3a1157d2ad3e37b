use tracing::{debug, info};

use crate::config::DEFAULT_OPENING_MATCH_TOLERANCE;
use crate::error::{OperationError, Result};
use crate::geometry::Polygon;
use crate::math::polygon_2d::is_finite_ring;
use crate::operations::boolean::{difference_polygon, reproject_openings};
use crate::scene::{Element, ElementId, Scene};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtractOutcome {
    /// Surviving pieces; the first keeps the original id.
    pub rooms: Vec<ElementId>,
    pub dropped_openings: usize,
    /// `false` when the cutter missed the room entirely.
    pub changed: bool,
}

/// Cuts a world-space polygon out of a room.
///
/// The difference may split the room. The first piece keeps the room's id
/// and name; further pieces get fresh ids and the name `"{name} (n)"`
/// counting from 2. Openings are reprojected onto the pieces.
pub struct SubtractRoom {
    target: ElementId,
    cutter: Polygon,
    tolerance: f64,
}

impl SubtractRoom {
    /// Creates a new `SubtractRoom` operation.
    #[must_use]
    pub fn new(target: ElementId, cutter: Polygon) -> Self {
        Self {
            target,
            cutter,
            tolerance: DEFAULT_OPENING_MATCH_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the subtraction.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for a cutter with fewer than
    /// three finite vertices, a lookup error for the target, and
    /// `GeometryError::Degenerate` when nothing of the room survives. The
    /// scene is untouched on every error.
    pub fn execute(&self, scene: &mut Scene) -> Result<SubtractOutcome> {
        if self.cutter.outer.len() < 3 || !is_finite_ring(&self.cutter.outer) {
            debug!(vertices = self.cutter.outer.len(), "subtract rejected");
            return Err(OperationError::InvalidInput(
                "subtract polygon needs at least 3 finite vertices".into(),
            )
            .into());
        }

        let room = scene.room(&self.target)?;
        let world = room.world_polygon();
        let overlaps = match (world.bounding_box(), self.cutter.bounding_box()) {
            (Some(a), Some(b)) => a.intersects(&b),
            _ => false,
        };
        if !overlaps {
            debug!(room = %self.target, "subtract polygon misses room");
            return Ok(SubtractOutcome {
                rooms: vec![self.target.clone()],
                dropped_openings: 0,
                changed: false,
            });
        }

        let pieces = difference_polygon(&world, &self.cutter)?;
        let (openings, dropped_openings) = reproject_openings(&[room], &pieces, self.tolerance);

        let replacements: Vec<Element> = pieces
            .into_iter()
            .zip(openings)
            .enumerate()
            .map(|(k, (polygon, carried))| {
                let mut piece = if k == 0 {
                    room.with_geometry(room.id.clone(), polygon)
                } else {
                    let mut extra = room.with_geometry(ElementId::generate("room"), polygon);
                    extra.name = format!("{} ({})", room.name, k + 1);
                    extra.widgets.clear();
                    extra
                };
                piece.wall_openings = carried.wall_openings;
                piece.hole_wall_openings = carried.hole_wall_openings;
                Element::Room(piece)
            })
            .collect();
        let ids: Vec<ElementId> = replacements.iter().map(|e| e.id().clone()).collect();

        let Some(index) = scene.position(&self.target) else {
            return Err(OperationError::ElementNotFound(self.target.to_string()).into());
        };
        scene.elements.splice(index..=index, replacements);

        info!(
            room = %self.target,
            pieces = ids.len(),
            dropped_openings,
            "room subtracted"
        );
        Ok(SubtractOutcome {
            rooms: ids,
            dropped_openings,
            changed: true,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::EngineConfig;
    use crate::geometry::{Aabb, WallOpening};
    use crate::math::Point2;
    use crate::scene::{RoomElement, RoomStyle};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(
            vec![
                Point2::new(x0, y0),
                Point2::new(x1, y0),
                Point2::new(x1, y1),
                Point2::new(x0, y1),
            ],
            vec![],
        )
    }

    fn scene_with_room() -> (Scene, ElementId) {
        let style = RoomStyle {
            floor_texture_url: "floor.png".into(),
            wall_texture_url: "wall.png".into(),
            wall_thickness: 10.0,
            wall_tile_size: 50.0,
        };
        let mut room = RoomElement::from_rect(
            &Aabb::from_corners(Point2::new(0.0, 0.0), Point2::new(100.0, 50.0)),
            &style,
        )
        .unwrap();
        room.name = "Hall".into();
        // Bottom edge, x in [10, 20].
        room.wall_openings.push(WallOpening::new(0, 0.1, 0.2).unwrap());
        let mut scene = Scene::new(&EngineConfig::default());
        let id = scene.add(Element::Room(room));
        (scene, id)
    }

    #[test]
    fn cut_through_splits_room() {
        let (mut scene, id) = scene_with_room();
        let outcome = SubtractRoom::new(id.clone(), rect(40.0, -10.0, 60.0, 60.0))
            .execute(&mut scene)
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.rooms.len(), 2);
        assert_eq!(outcome.rooms[0], id);
        assert_eq!(outcome.dropped_openings, 0);
        assert_eq!(scene.elements.len(), 2);

        let names: Vec<&str> = outcome
            .rooms
            .iter()
            .map(|r| scene.room(r).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["Hall", "Hall (2)"]);

        let openings: usize = outcome
            .rooms
            .iter()
            .map(|r| scene.room(r).unwrap().wall_openings.len())
            .sum();
        assert_eq!(openings, 1);
        let area: f64 = outcome
            .rooms
            .iter()
            .map(|r| scene.room(r).unwrap().polygon().area())
            .sum();
        assert_relative_eq!(area, 4000.0, epsilon = 1e-3);
    }

    #[test]
    fn cutter_applies_to_rotated_room() {
        let (mut scene, id) = scene_with_room();
        let Element::Room(room) = &mut scene.elements[0] else {
            panic!("expected room");
        };
        // 100x50 hall turned upright about (50, 25): world x 25..75, y -25..75.
        room.rotation = 90.0;

        let outcome = SubtractRoom::new(id, rect(0.0, 20.0, 100.0, 30.0))
            .execute(&mut scene)
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.rooms.len(), 2);
        let mut area = 0.0;
        for piece in &outcome.rooms {
            let piece = scene.room(piece).unwrap();
            assert_eq!(piece.rotation, 0.0);
            assert!(piece
                .vertices
                .iter()
                .all(|p| p.x > 25.0 - 1e-6 && p.x < 75.0 + 1e-6));
            area += piece.polygon().area();
        }
        assert_relative_eq!(area, 4500.0, epsilon = 1e-3);
    }

    #[test]
    fn inner_cut_creates_hole() {
        let (mut scene, id) = scene_with_room();
        let outcome = SubtractRoom::new(id.clone(), rect(40.0, 20.0, 60.0, 30.0))
            .execute(&mut scene)
            .unwrap();
        assert_eq!(outcome.rooms, vec![id.clone()]);
        assert_eq!(scene.room(&id).unwrap().holes.len(), 1);
    }

    #[test]
    fn missing_the_room_changes_nothing() {
        let (mut scene, id) = scene_with_room();
        let before = scene.clone();
        let outcome = SubtractRoom::new(id, rect(500.0, 500.0, 600.0, 600.0))
            .execute(&mut scene)
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(scene, before);
    }

    #[test]
    fn invalid_cutter_is_rejected() {
        let (mut scene, id) = scene_with_room();
        let line = Polygon::new(vec![Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)], vec![]);
        assert!(SubtractRoom::new(id, line).execute(&mut scene).is_err());
    }

    #[test]
    fn covering_cut_fails_without_touching_scene() {
        let (mut scene, id) = scene_with_room();
        let before = scene.clone();
        assert!(SubtractRoom::new(id, rect(-10.0, -10.0, 110.0, 60.0))
            .execute(&mut scene)
            .is_err());
        assert_eq!(scene, before);
    }
}
