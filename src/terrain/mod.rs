//! Sparse terrain storage.
//!
//! Terrain is painted as circular stamps. Each stamp is appended to every
//! fixed-size tile its bounding square touches, so a renderer only has to draw
//! the tiles in view. Tiles are keyed in memory by a packed pair of tile
//! indices; the `"{originX},{originY}"` string form exists only on the wire.

mod fill;
mod pipeline;

pub use fill::{FillMode, FillShape};
pub use pipeline::{FillQueue, FillRequestId, PendingFill, TextureCache, TextureState};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::DEFAULT_MAX_TILES_PER_STAMP;
use crate::error::{Result, TerrainError};

/// One circular brush application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainStamp {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub texture_url: String,
}

impl TerrainStamp {
    #[must_use]
    pub fn new(x: f64, y: f64, size: f64, texture_url: impl Into<String>) -> Self {
        Self {
            x,
            y,
            size,
            texture_url: texture_url.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(TerrainError::InvalidBrush("stamp position is not finite".into()).into());
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(TerrainError::InvalidBrush(format!(
                "stamp size must be positive, got {}",
                self.size
            ))
            .into());
        }
        Ok(())
    }
}

/// A tile: its floor-aligned world origin and the stamps in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainTile {
    pub x: f64,
    pub y: f64,
    pub stamps: Vec<TerrainStamp>,
}

/// Tile coordinate packed into 64 bits: high half `x` index, low half `y` index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey(u64);

impl TileKey {
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn new(ix: i32, iy: i32) -> Self {
        Self((u64::from(ix as u32) << 32) | u64::from(iy as u32))
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn indices(self) -> (i32, i32) {
        ((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }

    /// The tile containing world coordinate `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` if the tile index does not fit in
    /// an `i32`.
    pub fn containing(x: f64, y: f64, tile_size: f64) -> Result<Self> {
        Ok(Self::new(tile_index(x, tile_size)?, tile_index(y, tile_size)?))
    }

    /// World origin of the tile.
    #[must_use]
    pub fn origin(self, tile_size: f64) -> (f64, f64) {
        let (ix, iy) = self.indices();
        (f64::from(ix) * tile_size, f64::from(iy) * tile_size)
    }

    /// Wire form `"{originX},{originY}"`.
    #[must_use]
    pub fn to_wire(self, tile_size: f64) -> String {
        let (x, y) = self.origin(tile_size);
        format!("{x},{y}")
    }

    /// Parses the wire form back into a key.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidTileKey` if the key is not two numbers or
    /// is not aligned to a multiple of `tile_size`.
    pub fn from_wire(key: &str, tile_size: f64) -> Result<Self> {
        let invalid = || TerrainError::InvalidTileKey(key.to_owned());
        let (xs, ys) = key.split_once(',').ok_or_else(invalid)?;
        let x: f64 = xs.trim().parse().map_err(|_| invalid())?;
        let y: f64 = ys.trim().parse().map_err(|_| invalid())?;
        let ix = origin_to_index(x, tile_size).ok_or_else(invalid)?;
        let iy = origin_to_index(y, tile_size).ok_or_else(invalid)?;
        Ok(Self::new(ix, iy))
    }
}

/// Origins within this fraction of a tile of a grid line count as aligned.
const ALIGNMENT_TOLERANCE: f64 = 1e-9;

fn index_in_range(index: f64) -> Option<i32> {
    if index.is_finite() && index >= f64::from(i32::MIN) && index <= f64::from(i32::MAX) {
        #[allow(clippy::cast_possible_truncation)]
        Some(index as i32)
    } else {
        None
    }
}

fn tile_index(coord: f64, tile_size: f64) -> Result<i32> {
    index_in_range((coord / tile_size).floor()).ok_or_else(|| {
        TerrainError::InvalidBrush(format!("coordinate {coord} is outside the tile grid")).into()
    })
}

fn origin_to_index(origin: f64, tile_size: f64) -> Option<i32> {
    let scaled = origin / tile_size;
    let index = scaled.round();
    if (scaled - index).abs() > ALIGNMENT_TOLERANCE {
        return None;
    }
    index_in_range(index)
}

/// Sparse mapping from tile key to tile. An absent key is an empty tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainTileStore {
    tile_size: f64,
    max_tiles_per_stamp: usize,
    tiles: HashMap<TileKey, TerrainTile>,
}

impl TerrainTileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(tile_size: f64) -> Self {
        Self {
            tile_size,
            max_tiles_per_stamp: DEFAULT_MAX_TILES_PER_STAMP,
            tiles: HashMap::new(),
        }
    }

    /// Caps how many tiles one stamp may touch.
    #[must_use]
    pub fn with_tile_budget(mut self, max_tiles_per_stamp: usize) -> Self {
        self.max_tiles_per_stamp = max_tiles_per_stamp;
        self
    }

    #[must_use]
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Total stamp entries across tiles; a stamp spanning tiles counts once per tile.
    #[must_use]
    pub fn stamp_count(&self) -> usize {
        self.tiles.values().map(|t| t.stamps.len()).sum()
    }

    #[must_use]
    pub fn tile(&self, key: TileKey) -> Option<&TerrainTile> {
        self.tiles.get(&key)
    }

    /// Iterates tiles in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileKey, &TerrainTile)> {
        self.tiles.iter().map(|(k, t)| (*k, t))
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Keys of every tile whose square footprint intersects the stamp's
    /// bounding square.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` if the stamp leaves the tile grid
    /// or touches more tiles than the store's budget.
    pub fn affected_tiles(&self, stamp: &TerrainStamp) -> Result<Vec<TileKey>> {
        let half = stamp.size * 0.5;
        let x0 = tile_index(stamp.x - half, self.tile_size)?;
        let x1 = tile_index(stamp.x + half, self.tile_size)?;
        let y0 = tile_index(stamp.y - half, self.tile_size)?;
        let y1 = tile_index(stamp.y + half, self.tile_size)?;

        let columns = u64::try_from(i64::from(x1) - i64::from(x0) + 1).unwrap_or(0);
        let rows = u64::try_from(i64::from(y1) - i64::from(y0) + 1).unwrap_or(0);
        let count = columns.saturating_mul(rows);
        if count > u64::try_from(self.max_tiles_per_stamp).unwrap_or(u64::MAX) {
            return Err(TerrainError::InvalidBrush(format!(
                "stamp of size {} touches {count} tiles, limit is {}",
                stamp.size, self.max_tiles_per_stamp
            ))
            .into());
        }

        let mut keys = Vec::new();
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                keys.push(TileKey::new(ix, iy));
            }
        }
        Ok(keys)
    }

    /// Appends a stamp to every affected tile, creating missing tiles.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` for a non-finite position or a
    /// non-positive size; the store is left untouched.
    pub fn stamp(&mut self, stamp: TerrainStamp) -> Result<Vec<TileKey>> {
        self.stamp_with_activation(stamp, || {})
    }

    /// Like [`stamp`](Self::stamp), invoking `on_first_paint` once when the
    /// store goes from empty to non-empty.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` for an invalid stamp.
    pub fn stamp_with_activation<F: FnOnce()>(
        &mut self,
        stamp: TerrainStamp,
        on_first_paint: F,
    ) -> Result<Vec<TileKey>> {
        stamp.validate()?;
        let was_empty = self.tiles.is_empty();
        let keys = self.affected_tiles(&stamp)?;
        let tile_size = self.tile_size;

        for &key in &keys {
            let tile = self.tiles.entry(key).or_insert_with(|| {
                let (x, y) = key.origin(tile_size);
                trace!(x, y, "creating terrain tile");
                TerrainTile {
                    x,
                    y,
                    stamps: Vec::new(),
                }
            });
            tile.stamps.push(stamp.clone());
        }

        if was_empty {
            on_first_paint();
        }
        Ok(keys)
    }

    /// Serializes to the wire mapping keyed `"{x},{y}"`, sorted by key.
    #[must_use]
    pub fn to_wire(&self) -> BTreeMap<String, TerrainTile> {
        self.tiles
            .iter()
            .map(|(key, tile)| (key.to_wire(self.tile_size), tile.clone()))
            .collect()
    }

    /// Rebuilds a store from its wire mapping.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidTileKey` for a malformed or unaligned key,
    /// or a tile whose origin disagrees with its key.
    pub fn from_wire<'a, I>(tiles: I, tile_size: f64) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a TerrainTile)>,
    {
        let mut store = Self::new(tile_size);
        for (wire_key, tile) in tiles {
            let key = TileKey::from_wire(wire_key, tile_size)?;
            let (x, y) = key.origin(tile_size);
            let tol = ALIGNMENT_TOLERANCE * tile_size;
            if (tile.x - x).abs() > tol || (tile.y - y).abs() > tol {
                return Err(TerrainError::InvalidTileKey(format!(
                    "{wire_key} (tile origin {},{})",
                    tile.x, tile.y
                ))
                .into());
            }
            store.tiles.insert(key, tile.clone());
        }
        Ok(store)
    }

    /// Migrates a flat stamp list into tiles, bucketing each stamp by its
    /// centre (`floor(coord / tileSize) * tileSize`).
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` for a stamp outside the tile grid.
    pub fn from_legacy_stamps(stamps: &[TerrainStamp], tile_size: f64) -> Result<Self> {
        let mut store = Self::new(tile_size);
        for stamp in stamps {
            let key = TileKey::containing(stamp.x, stamp.y, tile_size)?;
            let (x, y) = key.origin(tile_size);
            store
                .tiles
                .entry(key)
                .or_insert_with(|| TerrainTile {
                    x,
                    y,
                    stamps: Vec::new(),
                })
                .stamps
                .push(stamp.clone());
        }
        debug!(
            stamps = stamps.len(),
            tiles = store.tiles.len(),
            "migrated legacy terrain"
        );
        Ok(store)
    }
}
