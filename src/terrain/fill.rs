use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Result, TerrainError};
use crate::geometry::Aabb;

use super::{TerrainStamp, TerrainTileStore};

/// Shape covered by a bulk fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    Rectangle,
    /// The ellipse inscribed in the bounds.
    Circle,
}

/// Fills a rectangle or ellipse with evenly spaced stamps.
///
/// Circles are filled ring by ring rather than by masking a dense grid, which
/// keeps stamp density even at every radius.
#[derive(Debug, Clone)]
pub struct FillShape {
    mode: FillMode,
    bounds: Aabb,
    brush_size: f64,
    texture_url: String,
    spacing_ratio: f64,
    min_ring_stamps: usize,
    max_stamps: usize,
}

impl FillShape {
    /// Creates a fill with default spacing (half the brush size).
    #[must_use]
    pub fn new(mode: FillMode, bounds: Aabb, brush_size: f64, texture_url: impl Into<String>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            mode,
            bounds,
            brush_size,
            texture_url: texture_url.into(),
            spacing_ratio: defaults.fill_spacing_ratio,
            min_ring_stamps: defaults.min_ring_stamps,
            max_stamps: defaults.max_fill_stamps,
        }
    }

    /// Takes spacing parameters from an engine config.
    #[must_use]
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.spacing_ratio = config.fill_spacing_ratio;
        self.min_ring_stamps = config.min_ring_stamps;
        self.max_stamps = config.max_fill_stamps;
        self
    }

    #[must_use]
    pub fn texture_url(&self) -> &str {
        &self.texture_url
    }

    fn validate(&self) -> Result<f64> {
        if self.bounds.is_degenerate() {
            return Err(TerrainError::InvalidBrush("fill bounds have no area".into()).into());
        }
        if !(self.brush_size.is_finite() && self.brush_size > 0.0) {
            return Err(TerrainError::InvalidBrush(format!(
                "brush size must be positive, got {}",
                self.brush_size
            ))
            .into());
        }
        let spacing = self.brush_size * self.spacing_ratio;
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(TerrainError::InvalidBrush("fill spacing must be positive".into()).into());
        }
        let estimate = self.estimated_stamps(spacing);
        #[allow(clippy::cast_precision_loss)]
        let limit = self.max_stamps as f64;
        if !estimate.is_finite() || estimate > limit {
            return Err(TerrainError::InvalidBrush(format!(
                "fill would place about {estimate:.0} stamps, limit is {}",
                self.max_stamps
            ))
            .into());
        }
        Ok(spacing)
    }

    /// Upper bound on the stamps a fill places, computed without placing them.
    #[allow(clippy::cast_precision_loss)]
    fn estimated_stamps(&self, spacing: f64) -> f64 {
        match self.mode {
            FillMode::Rectangle => {
                let columns = (self.bounds.width() / spacing).floor() + 2.0;
                let rows = (self.bounds.height() / spacing).floor() + 2.0;
                columns * rows
            }
            FillMode::Circle => {
                let max_radius = 0.5 * self.bounds.width().max(self.bounds.height());
                let rings = (max_radius / spacing).floor();
                let widest = (TAU * max_radius / spacing)
                    .ceil()
                    .max(self.min_ring_stamps as f64);
                1.0 + rings * widest
            }
        }
    }

    /// Computes the stamps without touching any store.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` for empty bounds or a non-positive brush.
    pub fn stamps(&self) -> Result<Vec<TerrainStamp>> {
        let spacing = self.validate()?;
        let centers = match self.mode {
            FillMode::Rectangle => self.grid_centers(spacing),
            FillMode::Circle => self.ring_centers(spacing),
        };
        Ok(centers
            .into_iter()
            .map(|(x, y)| TerrainStamp::new(x, y, self.brush_size, self.texture_url.clone()))
            .collect())
    }

    /// Stamps the shape into `store`, returning the number of stamps placed.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidBrush` before any stamp is applied.
    pub fn execute(&self, store: &mut TerrainTileStore) -> Result<usize> {
        let stamps = self.stamps()?;
        let count = stamps.len();
        for stamp in stamps {
            store.stamp(stamp)?;
        }
        Ok(count)
    }

    fn grid_centers(&self, spacing: f64) -> Vec<(f64, f64)> {
        let eps = spacing * 1e-9;
        let mut centers = Vec::new();
        let mut x = self.bounds.min.x;
        while x <= self.bounds.max.x + eps {
            let mut y = self.bounds.min.y;
            while y <= self.bounds.max.y + eps {
                centers.push((x, y));
                y += spacing;
            }
            x += spacing;
        }
        centers
    }

    fn ring_centers(&self, spacing: f64) -> Vec<(f64, f64)> {
        let center = self.bounds.center();
        let rx = self.bounds.width() * 0.5;
        let ry = self.bounds.height() * 0.5;
        let max_radius = rx.max(ry);

        let mut centers = vec![(center.x, center.y)];
        let mut radius = spacing;
        while radius <= max_radius {
            let count = ring_stamp_count(radius, spacing, self.min_ring_stamps);
            for k in 0..count {
                #[allow(clippy::cast_precision_loss)]
                let angle = TAU * k as f64 / count as f64;
                let x = center.x + radius * angle.cos();
                let y = center.y + radius * angle.sin();
                let nx = (x - center.x) / rx;
                let ny = (y - center.y) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    centers.push((x, y));
                }
            }
            radius += spacing;
        }
        centers
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ring_stamp_count(radius: f64, spacing: f64, min_count: usize) -> usize {
    let circumference = TAU * radius;
    min_count.max((circumference / spacing).ceil() as usize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn bounds(w: f64, h: f64) -> Aabb {
        Aabb::from_corners(Point2::new(0.0, 0.0), Point2::new(w, h))
    }

    #[test]
    fn rectangle_grid_spacing_is_half_brush() {
        let fill = FillShape::new(FillMode::Rectangle, bounds(100.0, 50.0), 50.0, "sand.png");
        let stamps = fill.stamps().unwrap();
        // x: 0,25,50,75,100 ; y: 0,25,50
        assert_eq!(stamps.len(), 15);
        assert!(stamps.iter().all(|s| (s.size - 50.0).abs() < f64::EPSILON));
    }

    #[test]
    fn circle_stamps_stay_inside_ellipse() {
        let b = bounds(200.0, 100.0);
        let fill = FillShape::new(FillMode::Circle, b, 20.0, "water.png");
        let stamps = fill.stamps().unwrap();
        let c = b.center();
        assert!((stamps[0].x - c.x).abs() < 1e-9 && (stamps[0].y - c.y).abs() < 1e-9);
        for s in &stamps {
            let nx = (s.x - c.x) / 100.0;
            let ny = (s.y - c.y) / 50.0;
            assert!(nx * nx + ny * ny <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn small_rings_use_minimum_stamp_count() {
        assert_eq!(ring_stamp_count(1.0, 10.0, 8), 8);
        // 2π·100 / 10 ≈ 62.8 → 63
        assert_eq!(ring_stamp_count(100.0, 10.0, 8), 63);
    }

    #[test]
    fn circle_fill_uses_fewer_stamps_than_dense_grid() {
        let b = bounds(400.0, 400.0);
        let ring = FillShape::new(FillMode::Circle, b, 40.0, "t").stamps().unwrap();
        let grid = FillShape::new(FillMode::Rectangle, b, 40.0, "t").stamps().unwrap();
        assert!(ring.len() < grid.len(), "ring={} grid={}", ring.len(), grid.len());
    }

    #[test]
    fn invalid_fill_is_rejected() {
        assert!(FillShape::new(FillMode::Rectangle, bounds(0.0, 10.0), 5.0, "t")
            .stamps()
            .is_err());
        assert!(FillShape::new(FillMode::Circle, bounds(10.0, 10.0), 0.0, "t")
            .stamps()
            .is_err());
    }

    #[test]
    fn fill_over_budget_is_rejected() {
        let huge = bounds(1e7, 1e7);
        assert!(FillShape::new(FillMode::Rectangle, huge, 1.0, "t").stamps().is_err());
        assert!(FillShape::new(FillMode::Circle, huge, 1.0, "t").stamps().is_err());

        let config = EngineConfig::default().with_terrain_budget(4096, 20);
        let small = FillShape::new(FillMode::Rectangle, bounds(100.0, 50.0), 50.0, "t");
        assert_eq!(small.clone().stamps().unwrap().len(), 15);
        assert!(small.with_config(&config).stamps().is_err());
    }

    #[test]
    fn execute_stamps_into_store() {
        let mut store = TerrainTileStore::new(2000.0);
        let placed = FillShape::new(FillMode::Rectangle, bounds(100.0, 100.0), 100.0, "t")
            .execute(&mut store)
            .unwrap();
        assert_eq!(placed, 9);
        assert!(store.stamp_count() >= 9);
    }
}
