use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tile edge length, in world units, used by persisted scenes.
pub const DEFAULT_TILE_SIZE: f64 = 2000.0;

/// Distance, in world units, within which a reprojected opening endpoint must
/// land on a new edge to be kept.
pub const DEFAULT_OPENING_MATCH_TOLERANCE: f64 = 5.0;

/// Most tiles a single stamp may touch.
pub const DEFAULT_MAX_TILES_PER_STAMP: usize = 4096;

/// Most stamps a single shape fill may place.
pub const DEFAULT_MAX_FILL_STAMPS: usize = 100_000;

/// Parameters controlling the engine.
///
/// `tile_size` and `opening_match_tolerance` are part of the persisted scene
/// contract; change them only for scenes that never interoperate with others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Terrain tile edge length.
    pub tile_size: f64,
    /// Opening reprojection tolerance after merge/subtract.
    pub opening_match_tolerance: f64,
    /// Extra pick radius added to wall half-thickness during hit-testing.
    pub hit_margin: f64,
    /// Stamp spacing for shape fills, as a fraction of brush size.
    pub fill_spacing_ratio: f64,
    /// Minimum number of stamps placed on each ring of a circle fill.
    pub min_ring_stamps: usize,
    /// Maximum retained snapshots; `0` keeps every snapshot.
    pub history_limit: usize,
    /// Stamps touching more tiles than this are rejected.
    pub max_tiles_per_stamp: usize,
    /// Fills that would place more stamps than this are rejected.
    pub max_fill_stamps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            opening_match_tolerance: DEFAULT_OPENING_MATCH_TOLERANCE,
            hit_margin: 5.0,
            fill_spacing_ratio: 0.5,
            min_ring_stamps: 8,
            history_limit: 100,
            max_tiles_per_stamp: DEFAULT_MAX_TILES_PER_STAMP,
            max_fill_stamps: DEFAULT_MAX_FILL_STAMPS,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    #[must_use]
    pub fn with_hit_margin(mut self, hit_margin: f64) -> Self {
        self.hit_margin = hit_margin;
        self
    }

    #[must_use]
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    #[must_use]
    pub fn with_terrain_budget(mut self, max_tiles_per_stamp: usize, max_fill_stamps: usize) -> Self {
        self.max_tiles_per_stamp = max_tiles_per_stamp;
        self.max_fill_stamps = max_fill_stamps;
        self
    }
}
