//! The editing session: one active scene, its history and the terrain fill
//! pipeline. Every successful mutation commits exactly one snapshot.

mod draft;

pub use draft::{RoomDraft, WallDraft};

use std::fmt;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{OperationError, Result, TerrainError};
use crate::geometry::{Aabb, Polygon};
use crate::history::{HistoryManager, HistorySnapshot};
use crate::math::Point2;
use crate::operations::query::PickElement;
use crate::operations::rooms::{
    MergeOutcome, MergeRooms, SubtractOutcome, SubtractRoom, WidgetResolution,
};
use crate::operations::walls::{CutOutcome, CutRectangle, EraseAt, EraseOutcome, MergeWalls};
use crate::scene::{Element, ElementId, Scene};
use crate::terrain::{
    FillMode, FillQueue, FillRequestId, FillShape, TerrainStamp, TextureCache, TileKey,
};

/// Result of a shape-fill request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// The texture was ready; this many stamps were painted.
    Applied(usize),
    /// Waiting on the texture. When `load_required` is set the host must
    /// start loading it and report back through [`Editor::texture_loaded`]
    /// or [`Editor::texture_failed`].
    Pending {
        id: FillRequestId,
        load_required: bool,
    },
}

type ActivationHook = Box<dyn FnMut()>;

pub struct Editor {
    scene: Scene,
    history: HistoryManager,
    config: EngineConfig,
    textures: TextureCache,
    fills: FillQueue,
    stroke: Option<usize>,
    on_activate: Option<ActivationHook>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("history", &self.history)
            .field("config", &self.config)
            .field("pending_fills", &self.fills.len())
            .field("stroke", &self.stroke)
            .field("on_activate", &self.on_activate.is_some())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Opens an empty scene.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::from_scene(Scene::new(&config), config)
    }

    /// Opens an existing scene. Its state becomes the baseline snapshot.
    #[must_use]
    pub fn from_scene(scene: Scene, config: EngineConfig) -> Self {
        let mut history = HistoryManager::new(config.history_limit);
        history.commit(HistorySnapshot::full(&scene));
        Self {
            scene,
            history,
            config,
            textures: TextureCache::new(),
            fills: FillQueue::new(),
            stroke: None,
            on_activate: None,
        }
    }

    /// Registers a callback fired when terrain is first painted into an empty
    /// scene, so the host can promote a placeholder scene.
    #[must_use]
    pub fn with_activation_hook(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_activate = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    #[must_use]
    pub fn pending_fills(&self) -> usize {
        self.fills.len()
    }

    fn commit_elements(&mut self) {
        self.history.commit(HistorySnapshot::elements_of(&self.scene));
    }

    fn commit_full(&mut self) {
        self.history.commit(HistorySnapshot::full(&self.scene));
    }

    /// Top-most element under `point`, using the configured hit margin.
    #[must_use]
    pub fn pick(&self, point: Point2) -> Option<&Element> {
        PickElement::new(point)
            .with_margin(self.config.hit_margin)
            .execute(&self.scene)
    }

    /// Adds an element on top of the z-order.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = self.scene.add(element);
        self.commit_elements();
        id
    }

    /// Applies `edit` to a copy of an element and stores the result.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for an unknown id, or `InvalidInput` if the
    /// edit changes the element's id.
    pub fn edit_element<F>(&mut self, id: &ElementId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Element),
    {
        let index = self
            .scene
            .position(id)
            .ok_or_else(|| OperationError::ElementNotFound(id.to_string()))?;
        let mut edited = self.scene.elements[index].clone();
        edit(&mut edited);
        if edited.id() != id {
            return Err(OperationError::InvalidInput("an edit may not change the id".into()).into());
        }
        self.scene.elements[index] = edited;
        self.commit_elements();
        Ok(())
    }

    /// Removes an element.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for an unknown id.
    pub fn delete_element(&mut self, id: &ElementId) -> Result<Element> {
        let element = self
            .scene
            .remove(id)
            .ok_or_else(|| OperationError::ElementNotFound(id.to_string()))?;
        self.commit_elements();
        Ok(element)
    }

    /// Merges overlapping rooms. See [`MergeRooms`].
    ///
    /// # Errors
    ///
    /// Propagates [`MergeRooms::execute`] errors; nothing is committed.
    pub fn merge_rooms(
        &mut self,
        rooms: Vec<ElementId>,
        resolution: Option<WidgetResolution>,
    ) -> Result<MergeOutcome> {
        let mut op = MergeRooms::new(rooms).with_tolerance(self.config.opening_match_tolerance);
        if let Some(resolution) = resolution {
            op = op.with_resolution(resolution);
        }
        let outcome = op.execute(&mut self.scene)?;
        if matches!(outcome, MergeOutcome::Merged { .. }) {
            self.commit_elements();
        }
        Ok(outcome)
    }

    /// Cuts a polygon out of a room. See [`SubtractRoom`].
    ///
    /// # Errors
    ///
    /// Propagates [`SubtractRoom::execute`] errors; nothing is committed.
    pub fn subtract_room(&mut self, room: ElementId, cutter: Polygon) -> Result<SubtractOutcome> {
        let outcome = SubtractRoom::new(room, cutter)
            .with_tolerance(self.config.opening_match_tolerance)
            .execute(&mut self.scene)?;
        if outcome.changed {
            self.commit_elements();
        }
        Ok(outcome)
    }

    /// Merges walls into one. See [`MergeWalls`].
    ///
    /// # Errors
    ///
    /// Propagates [`MergeWalls::execute`] errors; nothing is committed.
    pub fn merge_walls(&mut self, walls: Vec<ElementId>) -> Result<ElementId> {
        let id = MergeWalls::new(walls).execute(&mut self.scene)?;
        self.commit_elements();
        Ok(id)
    }

    /// Cuts walls and rooms along a rectangle. See [`CutRectangle`].
    ///
    /// # Errors
    ///
    /// Propagates [`CutRectangle::execute`] errors; nothing is committed.
    pub fn cut_rectangle(&mut self, rect: Aabb) -> Result<CutOutcome> {
        let outcome = CutRectangle::new(rect).execute(&mut self.scene)?;
        if outcome.changed {
            self.commit_elements();
        }
        Ok(outcome)
    }

    /// Erases a piece of wall. See [`EraseAt`].
    ///
    /// # Errors
    ///
    /// Propagates [`EraseAt::execute`] errors; nothing is committed.
    pub fn erase_at(&mut self, point: Point2, size: f64) -> Result<EraseOutcome> {
        let outcome = EraseAt::new(point, size).execute(&mut self.scene)?;
        self.commit_elements();
        Ok(outcome)
    }

    fn paint(&mut self, stamp: TerrainStamp) -> Result<Vec<TileKey>> {
        let hook = &mut self.on_activate;
        self.scene.terrain.stamp_with_activation(stamp, || {
            if let Some(hook) = hook.as_mut() {
                debug!("first terrain paint activates scene");
                hook();
            }
        })
    }

    /// Starts a paint stroke. Stamps accumulate until [`end_stroke`](Self::end_stroke).
    pub fn begin_stroke(&mut self) {
        if self.stroke.is_none() {
            self.stroke = Some(0);
        }
    }

    /// Paints one stamp of the current stroke, starting one if needed.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` for an invalid stamp.
    pub fn stroke_stamp(
        &mut self,
        x: f64,
        y: f64,
        size: f64,
        texture_url: &str,
    ) -> Result<Vec<TileKey>> {
        self.begin_stroke();
        let keys = self.paint(TerrainStamp::new(x, y, size, texture_url))?;
        if let Some(count) = self.stroke.as_mut() {
            *count += 1;
        }
        Ok(keys)
    }

    /// Ends the stroke, committing one terrain snapshot if anything was
    /// painted. Returns whether a snapshot was committed.
    pub fn end_stroke(&mut self) -> bool {
        match self.stroke.take() {
            Some(count) if count > 0 => {
                debug!(stamps = count, "paint stroke committed");
                self.commit_full();
                true
            }
            _ => false,
        }
    }

    fn apply_fill(&mut self, shape: &FillShape) -> Result<usize> {
        let stamps = shape.stamps()?;
        let count = stamps.len();
        for stamp in stamps {
            self.paint(stamp)?;
        }
        Ok(count)
    }

    /// Fills a rectangle or ellipse with stamps once its texture is ready.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` for empty bounds or a
    /// non-positive brush, before anything is queued or painted.
    pub fn fill_shape(
        &mut self,
        mode: FillMode,
        bounds: Aabb,
        brush_size: f64,
        texture_url: &str,
    ) -> Result<FillStatus> {
        let shape = FillShape::new(mode, bounds, brush_size, texture_url).with_config(&self.config);
        shape.stamps()?;

        if self.textures.is_ready(texture_url) {
            let count = self.apply_fill(&shape)?;
            self.commit_full();
            info!(stamps = count, texture = texture_url, "shape filled");
            return Ok(FillStatus::Applied(count));
        }
        let load_required = self.textures.begin_load(texture_url);
        let id = self.fills.enqueue(shape);
        Ok(FillStatus::Pending { id, load_required })
    }

    /// Reports a loaded texture and runs every fill waiting on it, oldest
    /// first, as one history step. Returns the number of fills applied.
    ///
    /// # Errors
    ///
    /// Returns a terrain error if a queued fill cannot be stamped.
    pub fn texture_loaded(&mut self, texture_url: &str) -> Result<usize> {
        self.textures.mark_ready(texture_url);
        let waiting = self.fills.take_for_texture(texture_url);
        if waiting.is_empty() {
            return Ok(0);
        }
        let mut stamps = 0;
        for (_, pending) in &waiting {
            stamps += self.apply_fill(&pending.shape)?;
        }
        self.commit_full();
        debug!(
            fills = waiting.len(),
            stamps,
            texture = texture_url,
            "deferred fills applied"
        );
        Ok(waiting.len())
    }

    /// Reports a failed texture load and discards the fills waiting on it.
    pub fn texture_failed(&mut self, texture_url: &str) -> usize {
        self.textures.mark_failed(texture_url);
        let dropped = self.fills.take_for_texture(texture_url).len();
        debug!(dropped, texture = texture_url, "texture failed; fills discarded");
        dropped
    }

    /// Withdraws a pending fill.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::UnknownFillRequest` if it already ran or was
    /// withdrawn.
    pub fn cancel_fill(&mut self, id: FillRequestId) -> Result<()> {
        self.fills
            .cancel(id)
            .map(|_| ())
            .ok_or_else(|| TerrainError::UnknownFillRequest.into())
    }

    fn restore_current(&mut self) {
        let Some(snapshot) = self.history.current() else {
            return;
        };
        self.scene.elements.clone_from(&snapshot.elements);
        if let Some(terrain) = self.history.terrain_at_cursor() {
            self.scene.terrain.clone_from(terrain);
        }
    }

    /// Steps back one snapshot. An open stroke is committed first. Returns
    /// `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        if self.history.undo().is_none() {
            return false;
        }
        self.restore_current();
        true
    }

    /// Steps forward one snapshot. Returns `false` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        if self.history.redo().is_none() {
            return false;
        }
        self.restore_current();
        true
    }
}
