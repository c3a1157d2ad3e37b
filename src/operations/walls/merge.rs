use tracing::{debug, info};

use crate::error::{OperationError, Result};
use crate::operations::boolean::add_cross_segment_vertices;
use crate::scene::{Element, ElementId, Scene};

use super::tiles::relocate_tiles;

/// Combines several walls into one multi-segment wall.
///
/// Every polyline of every wall is kept as its own segment. Wherever an edge
/// of one segment crosses an edge of another, both get a vertex at the
/// crossing. The new wall takes the first wall's style, the highest z-order
/// of the inputs and the list position of the earliest input.
pub struct MergeWalls {
    walls: Vec<ElementId>,
}

impl MergeWalls {
    /// Creates a new `MergeWalls` operation.
    #[must_use]
    pub fn new(walls: Vec<ElementId>) -> Self {
        Self { walls }
    }

    /// Executes the merge, returning the new wall's id.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than two distinct walls
    /// or walls without geometry, and a lookup error for a missing or
    /// non-wall id. The scene is untouched on every error.
    pub fn execute(&self, scene: &mut Scene) -> Result<ElementId> {
        let mut ids: Vec<&ElementId> = Vec::with_capacity(self.walls.len());
        for id in &self.walls {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.len() < 2 {
            debug!(requested = ids.len(), "wall merge rejected");
            return Err(
                OperationError::InvalidInput("merge needs at least two walls".into()).into(),
            );
        }

        let walls = ids
            .iter()
            .map(|id| scene.wall(id))
            .collect::<Result<Vec<_>>>()?;
        let polylines: Vec<_> = walls.iter().flat_map(|w| w.polylines()).collect();
        if polylines.is_empty() {
            return Err(OperationError::InvalidInput("walls have no geometry".into()).into());
        }
        let segments = add_cross_segment_vertices(&polylines);

        let mut merged = walls[0].fragment(Vec::new());
        merged.segments = segments;
        let mut offset = 0;
        for wall in &walls {
            let lines = wall.polylines();
            for (segment, line) in lines.iter().enumerate() {
                let target = offset + segment;
                if let Some(rebuilt) = merged.segments.get(target) {
                    let carried =
                        relocate_tiles(wall, segment, line, rebuilt, target, merged.wall_tile_size);
                    merged.transparent_tiles.extend(carried);
                }
            }
            offset += lines.len();
        }
        merged.z_index = walls.iter().map(|w| w.z_index).max().unwrap_or(merged.z_index);
        let merged_id = merged.id.clone();
        let owned: Vec<ElementId> = ids.iter().map(|&id| id.clone()).collect();

        let mut replacement = Some(Element::Wall(merged));
        let mut elements = Vec::with_capacity(scene.elements.len());
        for element in scene.elements.drain(..) {
            if owned.contains(element.id()) {
                if let Some(wall) = replacement.take() {
                    elements.push(wall);
                }
            } else {
                elements.push(element);
            }
        }
        scene.elements = elements;

        info!(wall = %merged_id, merged = owned.len(), "walls merged");
        Ok(merged_id)
    }
}
