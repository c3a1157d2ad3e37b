mod element;
pub mod serde_points;

pub use element::{
    AnnotationElement, Element, ElementId, RoomElement, RoomStyle, TokenElement, WallElement,
    WallStyle, Widget,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{OperationError, Result};
use crate::terrain::{TerrainStamp, TerrainTile, TerrainTileStore};

/// Edge length used for the "infinite canvas" mode.
pub const INFINITE_CANVAS_SIZE: f64 = 1_000_000.0;

/// The persisted / transmitted scene shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain_tiles: Option<BTreeMap<String, TerrainTile>>,
    /// Flat stamp list written before terrain was tiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Vec<TerrainStamp>>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// The active scene: element list plus terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub elements: Vec<Element>,
    pub terrain: TerrainTileStore,
    pub width: f64,
    pub height: f64,
}

impl Scene {
    /// Creates an empty scene with a `0 × 0` (unbounded) canvas.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            elements: Vec::new(),
            terrain: TerrainTileStore::new(config.tile_size)
                .with_tile_budget(config.max_tiles_per_stamp),
            width: 0.0,
            height: 0.0,
        }
    }

    /// Creates an empty scene on the large square "infinite" canvas.
    #[must_use]
    pub fn infinite(config: &EngineConfig) -> Self {
        Self {
            width: INFINITE_CANVAS_SIZE,
            height: INFINITE_CANVAS_SIZE,
            ..Self::new(config)
        }
    }

    #[must_use]
    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    #[must_use]
    pub fn position(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    /// Looks up a room by id.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` or `WrongKind`.
    pub fn room(&self, id: &ElementId) -> Result<&RoomElement> {
        let element = self
            .find(id)
            .ok_or_else(|| OperationError::ElementNotFound(id.to_string()))?;
        element.as_room().ok_or_else(|| {
            OperationError::WrongKind {
                id: id.to_string(),
                expected: "room",
                actual: element.kind_name(),
            }
            .into()
        })
    }

    /// Looks up a wall by id.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` or `WrongKind`.
    pub fn wall(&self, id: &ElementId) -> Result<&WallElement> {
        let element = self
            .find(id)
            .ok_or_else(|| OperationError::ElementNotFound(id.to_string()))?;
        element.as_wall().ok_or_else(|| {
            OperationError::WrongKind {
                id: id.to_string(),
                expected: "wall",
                actual: element.kind_name(),
            }
            .into()
        })
    }

    /// One above the highest z-order in the scene.
    #[must_use]
    pub fn next_z_index(&self) -> i32 {
        self.elements
            .iter()
            .map(Element::z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Appends an element on top of everything else and returns its id.
    pub fn add(&mut self, mut element: Element) -> ElementId {
        element.set_z_index(self.next_z_index());
        let id = element.id().clone();
        self.elements.push(element);
        id
    }

    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.position(id)?;
        Some(self.elements.remove(index))
    }

    /// Converts to the wire document.
    #[must_use]
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            elements: self.elements.clone(),
            terrain_tiles: (!self.terrain.is_empty()).then(|| self.terrain.to_wire()),
            terrain: None,
            width: self.width,
            height: self.height,
        }
    }

    /// Builds a scene from a wire document, migrating legacy flat terrain.
    ///
    /// # Errors
    ///
    /// Returns an error if a tile key is malformed or unaligned, or a legacy
    /// stamp lies outside the tile grid.
    pub fn from_document(doc: &SceneDocument, config: &EngineConfig) -> Result<Self> {
        let terrain = match (&doc.terrain_tiles, &doc.terrain) {
            (Some(tiles), _) => TerrainTileStore::from_wire(tiles, config.tile_size)?,
            (None, Some(stamps)) => TerrainTileStore::from_legacy_stamps(stamps, config.tile_size)?,
            (None, None) => TerrainTileStore::new(config.tile_size),
        }
        .with_tile_budget(config.max_tiles_per_stamp);
        Ok(Self {
            elements: doc.elements.clone(),
            terrain,
            width: doc.width,
            height: doc.height,
        })
    }

    /// Serializes the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    /// Parses a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or tile keys.
    pub fn from_json(json: &str, config: &EngineConfig) -> Result<Self> {
        let doc: SceneDocument = serde_json::from_str(json)?;
        Self::from_document(&doc, config)
    }
}
