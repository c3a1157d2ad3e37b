use crate::math::distance_2d::distance;
use crate::math::Point2;
use crate::scene::{Element, Scene};

use super::NearestEdge;

/// Finds the top-most element under a point.
///
/// Elements are tried from the highest z-order down; among equal z-orders
/// the later list entry is on top. Rooms hit inside their rotated outline
/// (holes excluded), walls within half their thickness plus `margin` of a
/// segment, tokens and annotations within half their size of their centre.
pub struct PickElement {
    point: Point2,
    margin: f64,
}

impl PickElement {
    /// Creates a new `PickElement` query with no extra wall margin.
    #[must_use]
    pub fn new(point: Point2) -> Self {
        Self { point, margin: 0.0 }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    fn hits(&self, element: &Element) -> bool {
        match element {
            Element::Room(room) => room.world_polygon().contains(&self.point),
            Element::Wall(wall) => {
                let reach = wall.wall_thickness * 0.5 + self.margin;
                wall.polylines().iter().any(|line| {
                    NearestEdge::new(self.point)
                        .open()
                        .execute(line)
                        .is_some_and(|hit| hit.distance <= reach)
                })
            }
            Element::Token(token) => {
                distance(&self.point, &Point2::new(token.x, token.y)) <= token.size * 0.5
            }
            Element::Annotation(note) => {
                distance(&self.point, &Point2::new(note.x, note.y)) <= note.size * 0.5
            }
        }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute<'a>(&self, scene: &'a Scene) -> Option<&'a Element> {
        let mut order: Vec<usize> = (0..scene.elements.len()).collect();
        order.sort_by(|&a, &b| {
            let za = scene.elements[a].z_index();
            let zb = scene.elements[b].z_index();
            zb.cmp(&za).then(b.cmp(&a))
        });
        order
            .into_iter()
            .map(|i| &scene.elements[i])
            .find(|e| self.hits(e))
    }
}
