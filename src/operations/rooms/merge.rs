use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::DEFAULT_OPENING_MATCH_TOLERANCE;
use crate::error::{OperationError, Result};
use crate::operations::boolean::{reproject_openings, union_polygons};
use crate::scene::{Element, ElementId, RoomElement, Scene, Widget};

use super::group::group_by_overlap;

/// How to settle widgets when more than one merged room carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetResolution {
    /// Keep only the widgets of this room.
    KeepFrom(ElementId),
    /// Concatenate all widget lists and renumber their order.
    CombineAll,
}

/// Rooms whose widgets must be reconciled before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConflict {
    pub rooms: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged {
        /// New rooms, primary merged room of each group first.
        rooms: Vec<ElementId>,
        removed: Vec<ElementId>,
        dropped_openings: usize,
    },
    /// No two requested rooms overlap or touch.
    NothingToMerge,
    /// The scene was not modified; retry with a [`WidgetResolution`].
    NeedsResolution(WidgetConflict),
}

/// Unions overlapping rooms into single rooms, carrying wall openings over.
///
/// Requested rooms are grouped by [`group_by_overlap`]; each group of two or
/// more becomes one room built from the first member's attributes, at the
/// list position of the group's earliest element and the group's highest
/// z-order. Rotation is baked into the new geometry.
pub struct MergeRooms {
    rooms: Vec<ElementId>,
    resolution: Option<WidgetResolution>,
    tolerance: f64,
}

struct BuiltGroup {
    members: Vec<ElementId>,
    rooms: Vec<RoomElement>,
}

impl MergeRooms {
    /// Creates a new `MergeRooms` operation.
    #[must_use]
    pub fn new(rooms: Vec<ElementId>) -> Self {
        Self {
            rooms,
            resolution: None,
            tolerance: DEFAULT_OPENING_MATCH_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: WidgetResolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Sets the opening match tolerance in world units.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Widgets for a merged group, or `None` when the group is in conflict
    /// and the resolution does not settle it.
    fn resolve_widgets(&self, group: &[&RoomElement]) -> Option<Vec<Widget>> {
        let carriers: Vec<&&RoomElement> =
            group.iter().filter(|r| !r.widgets.is_empty()).collect();
        if carriers.len() <= 1 {
            return Some(carriers.first().map(|r| r.widgets.clone()).unwrap_or_default());
        }
        match &self.resolution {
            None => None,
            Some(WidgetResolution::KeepFrom(id)) => group
                .iter()
                .find(|r| &r.id == id)
                .map(|r| r.widgets.clone()),
            Some(WidgetResolution::CombineAll) => {
                let mut combined = Vec::new();
                for room in group {
                    let mut widgets = room.widgets.clone();
                    widgets.sort_by_key(|w| w.order);
                    combined.extend(widgets);
                }
                for (order, widget) in (0_u32..).zip(combined.iter_mut()) {
                    widget.order = order;
                }
                Some(combined)
            }
        }
    }

    /// Executes the merge.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than two distinct
    /// rooms, a lookup error for a missing or non-room id, and
    /// `GeometryError::Degenerate` if a union fails. The scene is untouched on
    /// every error.
    pub fn execute(&self, scene: &mut Scene) -> Result<MergeOutcome> {
        let mut ids: Vec<&ElementId> = Vec::with_capacity(self.rooms.len());
        for id in &self.rooms {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.len() < 2 {
            debug!(requested = ids.len(), "merge rejected");
            return Err(
                OperationError::InvalidInput("merge needs at least two rooms".into()).into(),
            );
        }

        let sources = ids
            .iter()
            .map(|id| scene.room(id))
            .collect::<Result<Vec<_>>>()?;
        let groups: Vec<Vec<&RoomElement>> = group_by_overlap(&sources)
            .into_iter()
            .filter(|g| g.len() >= 2)
            .map(|g| g.into_iter().map(|i| sources[i]).collect())
            .collect();
        if groups.is_empty() {
            debug!(requested = ids.len(), "no overlapping rooms to merge");
            return Ok(MergeOutcome::NothingToMerge);
        }

        let mut widget_sets = Vec::with_capacity(groups.len());
        let mut conflicted = Vec::new();
        for group in &groups {
            match self.resolve_widgets(group) {
                Some(widgets) => widget_sets.push(widgets),
                None => conflicted.extend(
                    group
                        .iter()
                        .filter(|r| !r.widgets.is_empty())
                        .map(|r| r.id.clone()),
                ),
            }
        }
        if !conflicted.is_empty() {
            debug!(rooms = conflicted.len(), "merge deferred on widget conflict");
            return Ok(MergeOutcome::NeedsResolution(WidgetConflict { rooms: conflicted }));
        }

        let mut built = Vec::with_capacity(groups.len());
        let mut dropped_openings = 0;
        for (group, widgets) in groups.iter().zip(widget_sets) {
            let polygons: Vec<_> = group.iter().map(|r| r.world_polygon()).collect();
            let merged = union_polygons(&polygons)?;
            let (openings, dropped) = reproject_openings(group, &merged, self.tolerance);
            dropped_openings += dropped;

            let base = group[0];
            let z_index = group.iter().map(|r| r.z_index).max().unwrap_or(base.z_index);
            let rooms = merged
                .into_iter()
                .zip(openings)
                .enumerate()
                .map(|(k, (polygon, carried))| {
                    let mut room = base.with_geometry(ElementId::generate("room"), polygon);
                    room.wall_openings = carried.wall_openings;
                    room.hole_wall_openings = carried.hole_wall_openings;
                    room.z_index = z_index;
                    room.widgets = if k == 0 { widgets.clone() } else { Vec::new() };
                    room
                })
                .collect();
            built.push(BuiltGroup {
                members: group.iter().map(|r| r.id.clone()).collect(),
                rooms,
            });
        }

        let owner: HashMap<ElementId, usize> = built
            .iter()
            .enumerate()
            .flat_map(|(g, b)| b.members.iter().map(move |id| (id.clone(), g)))
            .collect();
        let mut pending: Vec<Option<Vec<RoomElement>>> =
            built.iter_mut().map(|b| Some(std::mem::take(&mut b.rooms))).collect();

        let mut new_ids = Vec::new();
        let mut elements = Vec::with_capacity(scene.elements.len());
        for element in scene.elements.drain(..) {
            let Some(&g) = owner.get(element.id()) else {
                elements.push(element);
                continue;
            };
            if let Some(rooms) = pending[g].take() {
                new_ids.extend(rooms.iter().map(|r| r.id.clone()));
                elements.extend(rooms.into_iter().map(Element::Room));
            }
        }
        scene.elements = elements;

        let removed: Vec<ElementId> = built.into_iter().flat_map(|b| b.members).collect();
        info!(
            groups = pending.len(),
            removed = removed.len(),
            created = new_ids.len(),
            dropped_openings,
            "rooms merged"
        );
        Ok(MergeOutcome::Merged {
            rooms: new_ids,
            removed,
            dropped_openings,
        })
    }
}
