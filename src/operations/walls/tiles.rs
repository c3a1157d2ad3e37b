//! Eraser tile keys on walls, `"{segment}:{edge}:{tile}"`.
//!
//! Tiles are counted from the start of each edge in steps of the wall's tile
//! size. When a wall's polylines are rebuilt, a key follows the centre of its
//! tile onto whichever new edge still carries that point.

use std::fmt;

use crate::math::distance_2d::distance;
use crate::math::{lerp, Point2, INTERSECTION_EPSILON};
use crate::operations::query::NearestEdge;
use crate::scene::WallElement;

/// How far a tile centre may sit from a rebuilt edge and still belong to it.
const LOCATE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WallTile {
    pub segment: usize,
    pub edge: usize,
    pub tile: u64,
}

impl WallTile {
    pub(crate) fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split(':');
        let segment = parts.next()?.parse().ok()?;
        let edge = parts.next()?.parse().ok()?;
        let tile = parts.next()?.parse().ok()?;
        parts.next().is_none().then_some(Self {
            segment,
            edge,
            tile,
        })
    }

    /// Centre of the tile's run along its edge of `line`. `None` if the edge
    /// or the tile does not exist.
    fn centre(&self, line: &[Point2], tile_size: f64) -> Option<Point2> {
        let a = line.get(self.edge)?;
        let b = line.get(self.edge + 1)?;
        let length = distance(a, b);
        if length <= INTERSECTION_EPSILON {
            return None;
        }
        let (start, end) = if tile_size > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let start = self.tile as f64 * tile_size;
            if start >= length {
                return None;
            }
            (start, (start + tile_size).min(length))
        } else {
            (0.0, length)
        };
        Some(lerp(a, b, 0.5 * (start + end) / length))
    }
}

impl fmt::Display for WallTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.segment, self.edge, self.tile)
    }
}

/// Tile holding the point `along` units from the start of an edge `length`
/// long. A point on the far end belongs to the last tile.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn tile_index(along: f64, length: f64, tile_size: f64) -> u64 {
    if tile_size <= 0.0 || !along.is_finite() || !length.is_finite() {
        return 0;
    }
    let last = ((length / tile_size).ceil() - 1.0).max(0.0);
    (along / tile_size).floor().clamp(0.0, last) as u64
}

/// Edge and tile of an open polyline that `point` lies on.
fn locate(line: &[Point2], point: Point2, tile_size: f64) -> Option<(usize, u64)> {
    let hit = NearestEdge::new(point).open().execute(line)?;
    if hit.distance > LOCATE_TOLERANCE {
        return None;
    }
    let length = distance(&line[hit.edge_index], &line[hit.edge_index + 1]);
    Some((
        hit.edge_index,
        tile_index(hit.ratio * length, length, tile_size),
    ))
}

/// Keys of `wall`'s polyline `segment` (drawn as `old`) carried onto the
/// rebuilt polyline `new`, which is stored as segment `target` of a wall
/// with tiles `tile_size` long. Tiles whose centre is no longer on `new` are
/// dropped.
pub(crate) fn relocate_tiles(
    wall: &WallElement,
    segment: usize,
    old: &[Point2],
    new: &[Point2],
    target: usize,
    tile_size: f64,
) -> Vec<String> {
    wall.transparent_tiles
        .iter()
        .filter_map(|key| WallTile::parse(key))
        .filter(|tile| tile.segment == segment)
        .filter_map(|tile| tile.centre(old, wall.wall_tile_size))
        .filter_map(|centre| locate(new, centre, tile_size))
        .map(|(edge, tile)| {
            WallTile {
                segment: target,
                edge,
                tile,
            }
            .to_string()
        })
        .collect()
}
