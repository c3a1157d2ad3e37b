use crate::geometry::Aabb;
use crate::scene::RoomElement;

/// Partitions `rooms` into overlap groups, returned as index lists.
///
/// Two rooms are candidates when their world bounding boxes, each expanded
/// by the larger of the two wall thicknesses, intersect. Rooms whose walls
/// merely touch therefore group together. Groups are closed transitively by
/// re-scanning until no group absorbs another. Every room appears in exactly
/// one group; groups keep input order.
#[must_use]
pub fn group_by_overlap(rooms: &[&RoomElement]) -> Vec<Vec<usize>> {
    let bounds: Vec<Option<Aabb>> = rooms.iter().map(|r| r.world_bounds()).collect();
    let touches = |a: usize, b: usize| -> bool {
        let (Some(ba), Some(bb)) = (&bounds[a], &bounds[b]) else {
            return false;
        };
        let margin = rooms[a].wall_thickness.max(rooms[b].wall_thickness);
        ba.expanded(margin).intersects(&bb.expanded(margin))
    };

    let mut groups: Vec<Vec<usize>> = (0..rooms.len()).map(|i| vec![i]).collect();
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < groups.len() {
            let mut j = i + 1;
            while j < groups.len() {
                let linked = groups[i]
                    .iter()
                    .any(|&a| groups[j].iter().any(|&b| touches(a, b)));
                if linked {
                    let absorbed = groups.remove(j);
                    groups[i].extend(absorbed);
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !changed {
            break;
        }
    }

    for group in &mut groups {
        group.sort_unstable();
    }
    groups
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::scene::RoomStyle;

    fn room(x0: f64, y0: f64, x1: f64, y1: f64) -> RoomElement {
        let style = RoomStyle {
            floor_texture_url: String::new(),
            wall_texture_url: String::new(),
            wall_thickness: 10.0,
            wall_tile_size: 50.0,
        };
        RoomElement::from_rect(
            &Aabb::from_corners(Point2::new(x0, y0), Point2::new(x1, y1)),
            &style,
        )
        .unwrap()
    }

    #[test]
    fn overlapping_rooms_form_one_group() {
        let a = room(0.0, 0.0, 100.0, 100.0);
        let b = room(50.0, 0.0, 150.0, 100.0);
        assert_eq!(group_by_overlap(&[&a, &b]), vec![vec![0, 1]]);
    }

    #[test]
    fn rooms_within_wall_thickness_group() {
        let a = room(0.0, 0.0, 100.0, 100.0);
        let b = room(115.0, 0.0, 200.0, 100.0);
        assert_eq!(group_by_overlap(&[&a, &b]).len(), 1);
    }

    #[test]
    fn distant_rooms_stay_apart() {
        let a = room(0.0, 0.0, 100.0, 100.0);
        let b = room(500.0, 0.0, 600.0, 100.0);
        assert_eq!(group_by_overlap(&[&a, &b]), vec![vec![0], vec![1]]);
    }

    #[test]
    fn grouping_is_transitive() {
        // a touches b, b touches c, a and c are far apart; c listed first.
        let c = room(180.0, 0.0, 260.0, 100.0);
        let a = room(0.0, 0.0, 100.0, 100.0);
        let b = room(90.0, 0.0, 190.0, 100.0);
        assert_eq!(group_by_overlap(&[&c, &a, &b]), vec![vec![0, 1, 2]]);
    }
}
