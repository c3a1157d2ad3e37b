use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use tracing::{debug, warn};

use crate::error::{GeometryError, Result};
use crate::geometry::Polygon;
use crate::math::polygon_2d::dedup_ring;
use crate::math::{Point2, TOLERANCE};

use super::intersections::add_intersection_vertices;

/// The boolean operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
}

type Path = Vec<[f64; 2]>;
type Shape = Vec<Path>;

fn ring_to_path(ring: &[Point2]) -> Path {
    ring.iter().map(|p| [p.x, p.y]).collect()
}

/// Outer ring followed by holes; the even-odd fill rule makes ring
/// orientation irrelevant.
fn polygon_to_paths(polygon: &Polygon) -> Vec<Path> {
    let mut paths = Vec::with_capacity(1 + polygon.holes.len());
    paths.push(ring_to_path(&polygon.outer));
    paths.extend(polygon.holes.iter().map(|h| ring_to_path(h)));
    paths
}

/// Converts overlay output back into polygons, re-cutting every ring at its
/// crossings and discarding rings that collapse below three vertices.
fn shapes_to_polygons(shapes: Vec<Shape>) -> Vec<Polygon> {
    let mut polygons = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let mut rings = shape.into_iter().map(|path| {
            let ring: Vec<Point2> = path.into_iter().map(|[x, y]| Point2::new(x, y)).collect();
            add_intersection_vertices(&dedup_ring(&ring, TOLERANCE))
        });
        let Some(outer) = rings.next() else {
            continue;
        };
        if outer.len() < 3 {
            continue;
        }
        let holes = rings.filter(|h| h.len() >= 3).collect();
        polygons.push(Polygon::new(outer, holes));
    }
    polygons
}

fn overlay(subject: &[Path], clip: &[Path], op: BooleanOp) -> Vec<Shape> {
    let rule = match op {
        BooleanOp::Union => OverlayRule::Union,
        BooleanOp::Difference => OverlayRule::Difference,
    };
    subject.to_vec().overlay(&clip.to_vec(), rule, FillRule::EvenOdd)
}

fn check_input(polygon: &Polygon) -> Result<()> {
    polygon.validate().map_err(|e| {
        warn!(error = %e, "rejecting boolean operand");
        e
    })
}

/// Folds a pairwise union across `polygons`.
///
/// A single polygon is returned unchanged. The result may contain several
/// disjoint polygons.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if an operand is invalid or the union
/// comes out empty.
pub fn union_polygons(polygons: &[Polygon]) -> Result<Vec<Polygon>> {
    let Some((first, rest)) = polygons.split_first() else {
        return Err(GeometryError::Degenerate("union of no polygons".into()).into());
    };
    for polygon in polygons {
        check_input(polygon)?;
    }
    if rest.is_empty() {
        return Ok(vec![first.clone()]);
    }

    let mut acc = polygon_to_paths(first);
    let mut shapes: Vec<Shape> = Vec::new();
    for polygon in rest {
        let clip = polygon_to_paths(polygon);
        shapes = overlay(&acc, &clip, BooleanOp::Union);
        acc = shapes.iter().flatten().cloned().collect();
    }

    let result = shapes_to_polygons(shapes);
    if result.is_empty() {
        warn!(operands = polygons.len(), "union produced no geometry");
        return Err(GeometryError::Degenerate("union produced empty result".into()).into());
    }
    debug!(operands = polygons.len(), outputs = result.len(), "union complete");
    Ok(result)
}

/// Subtracts `clip` from `subject`. The result may split into several polygons.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if an operand is invalid or nothing of
/// the subject survives.
pub fn difference_polygon(subject: &Polygon, clip: &Polygon) -> Result<Vec<Polygon>> {
    check_input(subject)?;
    check_input(clip)?;

    let shapes = overlay(
        &polygon_to_paths(subject),
        &polygon_to_paths(clip),
        BooleanOp::Difference,
    );
    let result = shapes_to_polygons(shapes);
    if result.is_empty() {
        warn!("difference produced no geometry");
        return Err(GeometryError::Degenerate("difference produced empty result".into()).into());
    }
    debug!(outputs = result.len(), "difference complete");
    Ok(result)
}
