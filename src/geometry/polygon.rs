use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{area_with_holes, is_finite_ring, point_in_polygon, rotate_points};
use crate::math::Point2;

use super::Aabb;

/// A polygon with holes: an implicitly closed outer ring plus hole rings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Polygon {
    #[must_use]
    pub fn new(outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        Self { outer, holes }
    }

    /// Checks the outer ring has at least three finite vertices.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` or `GeometryError::NonFinite`.
    pub fn validate(&self) -> Result<()> {
        if self.outer.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon needs at least 3 vertices, got {}",
                self.outer.len()
            ))
            .into());
        }
        if !is_finite_ring(&self.outer) || !self.holes.iter().all(|h| is_finite_ring(h)) {
            return Err(GeometryError::NonFinite("polygon").into());
        }
        Ok(())
    }

    /// Enclosed area (outer minus holes).
    #[must_use]
    pub fn area(&self) -> f64 {
        area_with_holes(&self.outer, &self.holes)
    }

    /// Bounding box of the outer ring.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.outer)
    }

    /// Returns the polygon rotated about the centre of its outer bounding box.
    #[must_use]
    pub fn rotated(&self, degrees: f64) -> Self {
        let Some(bbox) = self.bounding_box() else {
            return self.clone();
        };
        let center = bbox.center();
        Self {
            outer: rotate_points(&self.outer, &center, degrees),
            holes: self
                .holes
                .iter()
                .map(|h| rotate_points(h, &center, degrees))
                .collect(),
        }
    }

    /// Inside the outer ring and outside every hole.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        point_in_polygon(p, &self.outer) && !self.holes.iter().any(|h| point_in_polygon(p, h))
    }
}
