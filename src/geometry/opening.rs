use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{lerp, Point2, INTERSECTION_EPSILON};

/// A gap along one edge of a room ring or wall polyline.
///
/// `segment_index` selects the edge `ring[i] → ring[i + 1]` (wrapping for closed
/// rings); the ratios locate the gap along that edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallOpening {
    pub segment_index: usize,
    pub start_ratio: f64,
    pub end_ratio: f64,
}

/// A [`WallOpening`] on one of a room's hole rings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleWallOpening {
    pub hole_index: usize,
    pub segment_index: usize,
    pub start_ratio: f64,
    pub end_ratio: f64,
}

fn check_ratios(start_ratio: f64, end_ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&start_ratio) {
        return Err(GeometryError::RatioOutOfRange {
            parameter: "start_ratio",
            value: start_ratio,
            min: 0.0,
            max: 1.0,
        }
        .into());
    }
    if !(0.0..=1.0).contains(&end_ratio) || end_ratio <= start_ratio {
        return Err(GeometryError::RatioOutOfRange {
            parameter: "end_ratio",
            value: end_ratio,
            min: start_ratio,
            max: 1.0,
        }
        .into());
    }
    Ok(())
}

fn edge_points(ring: &[Point2], segment_index: usize, closed: bool) -> Option<(Point2, Point2)> {
    let n = ring.len();
    let a = *ring.get(segment_index)?;
    let b = if segment_index + 1 < n {
        ring[segment_index + 1]
    } else if closed && n >= 2 {
        ring[0]
    } else {
        return None;
    };
    Some((a, b))
}

impl WallOpening {
    /// Creates an opening.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::RatioOutOfRange` unless `0 ≤ start < end ≤ 1`.
    pub fn new(segment_index: usize, start_ratio: f64, end_ratio: f64) -> Result<Self> {
        check_ratios(start_ratio, end_ratio)?;
        Ok(Self {
            segment_index,
            start_ratio,
            end_ratio,
        })
    }

    /// An opening spanning the whole edge.
    #[must_use]
    pub fn full_edge(segment_index: usize) -> Self {
        Self {
            segment_index,
            start_ratio: 0.0,
            end_ratio: 1.0,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        check_ratios(self.start_ratio, self.end_ratio).is_ok()
    }

    /// Absolute start and end points of the gap on a closed ring.
    #[must_use]
    pub fn world_points(&self, ring: &[Point2]) -> Option<(Point2, Point2)> {
        let (a, b) = edge_points(ring, self.segment_index, true)?;
        Some((lerp(&a, &b, self.start_ratio), lerp(&a, &b, self.end_ratio)))
    }
}

impl HoleWallOpening {
    /// Creates a hole opening.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::RatioOutOfRange` unless `0 ≤ start < end ≤ 1`.
    pub fn new(
        hole_index: usize,
        segment_index: usize,
        start_ratio: f64,
        end_ratio: f64,
    ) -> Result<Self> {
        check_ratios(start_ratio, end_ratio)?;
        Ok(Self {
            hole_index,
            segment_index,
            start_ratio,
            end_ratio,
        })
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        check_ratios(self.start_ratio, self.end_ratio).is_ok()
    }

    /// Absolute start and end points of the gap on its hole ring.
    #[must_use]
    pub fn world_points(&self, holes: &[Vec<Point2>]) -> Option<(Point2, Point2)> {
        let ring = holes.get(self.hole_index)?;
        let (a, b) = edge_points(ring, self.segment_index, true)?;
        Some((lerp(&a, &b, self.start_ratio), lerp(&a, &b, self.end_ratio)))
    }
}

/// Maps the part of `[start, end]` that falls inside `[lo, hi]` of an old edge
/// onto a new edge covering exactly `[lo, hi]`.
///
/// Returns `None` when the overlap is empty or too short to keep.
#[must_use]
pub fn rescale_span(start: f64, end: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    let len = hi - lo;
    if len <= INTERSECTION_EPSILON {
        return None;
    }
    let s = ((start.max(lo) - lo) / len).clamp(0.0, 1.0);
    let e = ((end.min(hi) - lo) / len).clamp(0.0, 1.0);
    (e - s > INTERSECTION_EPSILON).then_some((s, e))
}

/// Merges `[start, end]` into the spans of one edge, joining overlaps.
pub(crate) fn merge_span(spans: &mut Vec<(f64, f64)>, start: f64, end: f64) {
    let mut lo = start;
    let mut hi = end;
    spans.retain(|&(s, e)| {
        let overlaps = s <= hi && lo <= e;
        if overlaps {
            lo = lo.min(s);
            hi = hi.max(e);
        }
        !overlaps
    });
    spans.push((lo, hi));
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
}

/// Inserts an opening, merging it with overlapping openings on the same edge.
pub fn insert_opening(openings: &mut Vec<WallOpening>, opening: WallOpening) {
    let mut spans: Vec<(f64, f64)> = openings
        .iter()
        .filter(|o| o.segment_index == opening.segment_index)
        .map(|o| (o.start_ratio, o.end_ratio))
        .collect();
    merge_span(&mut spans, opening.start_ratio, opening.end_ratio);
    openings.retain(|o| o.segment_index != opening.segment_index);
    openings.extend(spans.into_iter().map(|(s, e)| WallOpening {
        segment_index: opening.segment_index,
        start_ratio: s,
        end_ratio: e,
    }));
    openings.sort_by(|a, b| {
        a.segment_index
            .cmp(&b.segment_index)
            .then(a.start_ratio.total_cmp(&b.start_ratio))
    });
}

/// Inserts a hole opening, merging it with overlapping openings on the same
/// hole edge.
pub fn insert_hole_opening(openings: &mut Vec<HoleWallOpening>, opening: HoleWallOpening) {
    let same_edge = |o: &HoleWallOpening| {
        o.hole_index == opening.hole_index && o.segment_index == opening.segment_index
    };
    let mut spans: Vec<(f64, f64)> = openings
        .iter()
        .filter(|o| same_edge(o))
        .map(|o| (o.start_ratio, o.end_ratio))
        .collect();
    merge_span(&mut spans, opening.start_ratio, opening.end_ratio);
    openings.retain(|o| !same_edge(o));
    openings.extend(spans.into_iter().map(|(s, e)| HoleWallOpening {
        hole_index: opening.hole_index,
        segment_index: opening.segment_index,
        start_ratio: s,
        end_ratio: e,
    }));
    openings.sort_by(|a, b| {
        a.hole_index
            .cmp(&b.hole_index)
            .then(a.segment_index.cmp(&b.segment_index))
            .then(a.start_ratio.total_cmp(&b.start_ratio))
    });
}
