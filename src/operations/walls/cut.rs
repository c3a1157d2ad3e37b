use tracing::{debug, info, trace};

use crate::error::{OperationError, Result};
use crate::geometry::{
    insert_hole_opening, insert_opening, merge_span, rescale_span, Aabb, HoleWallOpening,
    WallOpening,
};
use crate::math::intersect_2d::clip_segment_to_rect;
use crate::math::{lerp, points_coincide, Point2, INTERSECTION_EPSILON};
use crate::scene::{Element, ElementId, RoomElement, Scene, WallElement};

use super::tiles::relocate_tiles;

/// Opening spans `(start, end)` per edge of one ring.
type Spans = Vec<(f64, f64)>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutOutcome {
    /// Walls replaced by fragments and rooms that collapsed.
    pub removed: Vec<ElementId>,
    /// Wall fragments.
    pub added: Vec<ElementId>,
    /// Rooms whose outline or openings changed in place.
    pub modified: Vec<ElementId>,
    pub changed: bool,
}

/// Result of cutting one closed ring.
enum RingCut {
    Unchanged,
    Collapsed,
    Cut { ring: Vec<Point2>, spans: Vec<Spans> },
}

/// Cuts every wall and room along an axis-aligned rectangle.
///
/// Wall edges overlapping the rectangle are split around the overlap and
/// every surviving piece becomes its own wall. Room vertices strictly inside
/// the rectangle are replaced by the two points where the ring enters and
/// leaves it, and the new edge between them is left open. An edge that only
/// passes through the rectangle gets an opening over the overlap. Holes are
/// cut the same way. Rings left with fewer than three vertices are dropped,
/// and a room whose outer ring is dropped is removed.
pub struct CutRectangle {
    rect: Aabb,
}

/// Overlap interval of `a → b` with the rectangle, ignoring runs along its
/// border.
fn crossing(a: &Point2, b: &Point2, rect: &Aabb) -> Option<(f64, f64)> {
    let (t0, t1) = clip_segment_to_rect(a, b, rect)?;
    rect.contains_strict(&lerp(a, b, 0.5 * (t0 + t1)))
        .then_some((t0, t1))
}

/// Splits one open polyline around the rectangle. Returns `None` if no edge
/// overlaps it.
fn cut_polyline(line: &[Point2], rect: &Aabb) -> Option<Vec<Vec<Point2>>> {
    let mut fragments = Vec::new();
    let mut current: Vec<Point2> = Vec::new();
    let mut touched = false;

    for pair in line.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if current.is_empty() {
            current.push(a);
        }
        let Some((t0, t1)) = crossing(&a, &b, rect) else {
            current.push(b);
            continue;
        };
        touched = true;
        if t0 > INTERSECTION_EPSILON {
            current.push(lerp(&a, &b, t0));
        }
        if current.len() >= 2 {
            fragments.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }
        if t1 < 1.0 - INTERSECTION_EPSILON {
            current = vec![lerp(&a, &b, t1), b];
        }
    }
    if current.len() >= 2 {
        fragments.push(current);
    }
    touched.then_some(fragments)
}

fn rescaled(spans: &[(f64, f64)], lo: f64, hi: f64) -> Spans {
    spans
        .iter()
        .filter_map(|&(s, e)| rescale_span(s, e, lo, hi))
        .collect()
}

/// Appends a vertex. A vertex landing on the previous one replaces that
/// vertex's outgoing spans instead of adding a zero-length edge.
fn push_vertex(out: &mut Vec<(Point2, Spans)>, point: Point2, spans: Spans) {
    if let Some(last) = out.last_mut() {
        if points_coincide(&last.0, &point, INTERSECTION_EPSILON) {
            last.1 = spans;
            return;
        }
    }
    out.push((point, spans));
}

fn cut_ring(ring: &[Point2], mut spans: Vec<Spans>, rect: &Aabb) -> RingCut {
    let n = ring.len();
    let inside: Vec<bool> = ring.iter().map(|p| rect.contains_strict(p)).collect();
    let Some(start) = inside.iter().position(|&i| !i) else {
        return RingCut::Collapsed;
    };

    if !inside.contains(&true) {
        let mut touched = false;
        for i in 0..n {
            if let Some((t0, t1)) = crossing(&ring[i], &ring[(i + 1) % n], rect) {
                merge_span(&mut spans[i], t0, t1);
                touched = true;
            }
        }
        return if touched {
            RingCut::Cut {
                ring: ring.to_vec(),
                spans,
            }
        } else {
            RingCut::Unchanged
        };
    }

    // Walk from an outside vertex so every run of inside vertices is bounded.
    let order: Vec<usize> = (0..n).map(|k| (start + k) % n).collect();
    let mut out: Vec<(Point2, Spans)> = Vec::with_capacity(n + 2);
    let mut k = 0;
    while k < n {
        let i = order[k];
        let next = order[(k + 1) % n];
        let (a, b) = (ring[i], ring[next]);

        if !inside[next] {
            let mut edge = spans[i].clone();
            if let Some((t0, t1)) = crossing(&a, &b, rect) {
                merge_span(&mut edge, t0, t1);
            }
            push_vertex(&mut out, a, edge);
            k += 1;
            continue;
        }

        let mut m = k + 1;
        while m < n && inside[order[m]] {
            m += 1;
        }
        let last_inside = order[m - 1];
        let exit = order[m % n];
        let (c, d) = (ring[last_inside], ring[exit]);
        let t_in = clip_segment_to_rect(&a, &b, rect).map_or(1.0, |(t0, _)| t0);
        let t_out = clip_segment_to_rect(&c, &d, rect).map_or(0.0, |(_, t1)| t1);
        trace!(dropped = m - k - 1, t_in, t_out, "ring enters and leaves cut");

        push_vertex(&mut out, a, rescaled(&spans[i], 0.0, t_in));
        push_vertex(&mut out, lerp(&a, &b, t_in), vec![(0.0, 1.0)]);
        push_vertex(&mut out, lerp(&c, &d, t_out), rescaled(&spans[last_inside], t_out, 1.0));
        k = m;
    }

    if out.len() >= 2 && points_coincide(&out[out.len() - 1].0, &out[0].0, INTERSECTION_EPSILON) {
        out.pop();
    }
    if out.len() < 3 {
        return RingCut::Collapsed;
    }
    let (ring, spans) = out.into_iter().unzip();
    RingCut::Cut { ring, spans }
}

fn spans_for(n: usize, openings: impl Iterator<Item = (usize, f64, f64)>) -> Vec<Spans> {
    let mut spans = vec![Vec::new(); n];
    for (segment, s, e) in openings {
        if let Some(edge) = spans.get_mut(segment) {
            edge.push((s, e));
        }
    }
    spans
}

/// Cuts a room, returning `None` when the rectangle leaves it alone and
/// `Some(None)` when the outer ring collapses.
fn cut_room(room: &RoomElement, rect: &Aabb) -> Option<Option<RoomElement>> {
    let world = room.world_polygon();
    if !world.bounding_box()?.intersects(rect) {
        return None;
    }

    let outer_spans = spans_for(
        world.outer.len(),
        room.wall_openings
            .iter()
            .map(|o| (o.segment_index, o.start_ratio, o.end_ratio)),
    );
    let mut changed = false;
    let (outer, outer_spans) = match cut_ring(&world.outer, outer_spans, rect) {
        RingCut::Collapsed => return Some(None),
        RingCut::Unchanged => (world.outer.clone(), None),
        RingCut::Cut { ring, spans } => {
            changed = true;
            (ring, Some(spans))
        }
    };

    let mut holes = Vec::with_capacity(world.holes.len());
    let mut hole_openings: Vec<HoleWallOpening> = Vec::new();
    for (h, hole) in world.holes.iter().enumerate() {
        let spans = spans_for(
            hole.len(),
            room.hole_wall_openings
                .iter()
                .filter(|o| o.hole_index == h)
                .map(|o| (o.segment_index, o.start_ratio, o.end_ratio)),
        );
        let (ring, spans) = match cut_ring(hole, spans.clone(), rect) {
            RingCut::Collapsed => {
                changed = true;
                continue;
            }
            RingCut::Unchanged => (hole.clone(), spans),
            RingCut::Cut { ring, spans } => {
                changed = true;
                (ring, spans)
            }
        };
        let hole_index = holes.len();
        for (segment_index, edge) in spans.into_iter().enumerate() {
            for (start_ratio, end_ratio) in edge {
                insert_hole_opening(
                    &mut hole_openings,
                    HoleWallOpening {
                        hole_index,
                        segment_index,
                        start_ratio,
                        end_ratio,
                    },
                );
            }
        }
        holes.push(ring);
    }

    if !changed {
        return None;
    }

    let mut cut = room.clone();
    if let Some(spans) = outer_spans {
        cut.wall_openings.clear();
        for (segment_index, edge) in spans.into_iter().enumerate() {
            for (start_ratio, end_ratio) in edge {
                insert_opening(
                    &mut cut.wall_openings,
                    WallOpening {
                        segment_index,
                        start_ratio,
                        end_ratio,
                    },
                );
            }
        }
    }
    cut.vertices = outer;
    cut.holes = holes;
    cut.hole_wall_openings = hole_openings;
    cut.rotation = 0.0;
    Some(Some(cut))
}

impl CutRectangle {
    /// Creates a new `CutRectangle` operation.
    #[must_use]
    pub fn new(rect: Aabb) -> Self {
        Self { rect }
    }

    /// Executes the cut as one replacement of the element list.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the rectangle has no area.
    pub fn execute(&self, scene: &mut Scene) -> Result<CutOutcome> {
        if self.rect.is_degenerate() {
            debug!("cut rejected: rectangle has no area");
            return Err(
                OperationError::InvalidInput("cut rectangle has no area".into()).into(),
            );
        }

        let mut outcome = CutOutcome::default();
        let mut elements = Vec::with_capacity(scene.elements.len());
        for element in &scene.elements {
            match element {
                Element::Wall(wall) => match self.cut_wall(wall) {
                    Some(fragments) => {
                        outcome.removed.push(wall.id.clone());
                        outcome
                            .added
                            .extend(fragments.iter().map(|f| f.id.clone()));
                        elements.extend(fragments.into_iter().map(Element::Wall));
                    }
                    None => elements.push(element.clone()),
                },
                Element::Room(room) => match cut_room(room, &self.rect) {
                    Some(Some(cut)) => {
                        outcome.modified.push(cut.id.clone());
                        elements.push(Element::Room(cut));
                    }
                    Some(None) => outcome.removed.push(room.id.clone()),
                    None => elements.push(element.clone()),
                },
                Element::Token(_) | Element::Annotation(_) => elements.push(element.clone()),
            }
        }

        outcome.changed = !(outcome.removed.is_empty() && outcome.modified.is_empty());
        if outcome.changed {
            scene.elements = elements;
            info!(
                removed = outcome.removed.len(),
                added = outcome.added.len(),
                modified = outcome.modified.len(),
                "rectangle cut applied"
            );
        } else {
            debug!("rectangle cut touched nothing");
        }
        Ok(outcome)
    }

    /// Fragments of a wall the rectangle overlaps, or `None` if it misses.
    /// Transparent tiles that survive the cut move onto their fragment.
    fn cut_wall(&self, wall: &WallElement) -> Option<Vec<WallElement>> {
        let lines = wall.polylines();
        let cuts: Vec<_> = lines
            .iter()
            .map(|line| cut_polyline(line, &self.rect))
            .collect();
        if cuts.iter().all(Option::is_none) {
            return None;
        }

        let mut pieces = Vec::new();
        for (segment, (line, cut)) in lines.iter().zip(cuts).enumerate() {
            for vertices in cut.unwrap_or_else(|| vec![line.clone()]) {
                let mut piece = wall.fragment(Vec::new());
                piece.transparent_tiles.extend(relocate_tiles(
                    wall,
                    segment,
                    line,
                    &vertices,
                    0,
                    wall.wall_tile_size,
                ));
                piece.vertices = vertices;
                pieces.push(piece);
            }
        }
        Some(pieces)
    }
}
