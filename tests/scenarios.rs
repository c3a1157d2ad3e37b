//! End-to-end editing scenarios driven through the `Editor`.

use approx::assert_relative_eq;
use battlemap::config::EngineConfig;
use battlemap::editor::{Editor, RoomDraft, WallDraft};
use battlemap::geometry::{Aabb, WallOpening};
use battlemap::math::Point2;
use battlemap::operations::rooms::{group_by_overlap, MergeOutcome};
use battlemap::scene::{Element, RoomElement, RoomStyle, Scene, WallElement, WallStyle};
use battlemap::terrain::{FillMode, TileKey};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn room_style() -> RoomStyle {
    RoomStyle {
        floor_texture_url: "floor.png".into(),
        wall_texture_url: "wall.png".into(),
        wall_thickness: 10.0,
        wall_tile_size: 50.0,
    }
}

fn wall_style() -> WallStyle {
    WallStyle {
        wall_texture_url: "stone.png".into(),
        wall_thickness: 8.0,
        wall_tile_size: 50.0,
    }
}

fn room(x0: f64, y0: f64, x1: f64, y1: f64) -> RoomElement {
    RoomElement::from_rect(
        &Aabb::from_corners(Point2::new(x0, y0), Point2::new(x1, y1)),
        &room_style(),
    )
    .unwrap()
}

#[test]
fn stamp_creates_origin_tile() {
    init_tracing();
    let mut editor = Editor::new(EngineConfig::default());
    let keys = editor.stroke_stamp(100.0, 100.0, 40.0, "grass.png").unwrap();
    editor.end_stroke();

    assert_eq!(keys, vec![TileKey::new(0, 0)]);
    let tiles = editor.scene().terrain.to_wire();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles["0,0"].stamps.len(), 1);
}

#[test]
fn stamp_in_next_tile_leaves_first_alone() {
    init_tracing();
    let mut editor = Editor::new(EngineConfig::default());
    editor.stroke_stamp(100.0, 100.0, 40.0, "grass.png").unwrap();
    editor.stroke_stamp(2100.0, 100.0, 40.0, "grass.png").unwrap();
    editor.end_stroke();

    let tiles = editor.scene().terrain.to_wire();
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles["0,0"].stamps.len(), 1);
    assert_eq!(tiles["2000,0"].stamps.len(), 1);
    assert_eq!(tiles["2000,0"].x, 2000.0);
}

#[test]
fn overlapping_rooms_group_and_union() {
    init_tracing();
    let a = room(0.0, 0.0, 100.0, 100.0);
    let b = room(50.0, 0.0, 150.0, 100.0);
    assert_eq!(group_by_overlap(&[&a, &b]), vec![vec![0, 1]]);

    let mut editor = Editor::new(EngineConfig::default());
    let ids = vec![
        editor.add_element(Element::Room(a)),
        editor.add_element(Element::Room(b)),
    ];
    let MergeOutcome::Merged { rooms, .. } = editor.merge_rooms(ids, None).unwrap() else {
        panic!("expected merge");
    };
    assert_eq!(rooms.len(), 1);

    let merged = editor.scene().room(&rooms[0]).unwrap();
    let bbox = merged.polygon().bounding_box().unwrap();
    assert_relative_eq!(bbox.min.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(bbox.max.x, 150.0, epsilon = 1e-6);
    assert_relative_eq!(bbox.min.y, 0.0, epsilon = 1e-6);
    assert_relative_eq!(bbox.max.y, 100.0, epsilon = 1e-6);
    // Collinear vertices on the shared edges are collapsed by the overlay.
    assert_eq!(merged.vertices.len(), 4);
    assert!(merged.holes.is_empty());
    assert_relative_eq!(merged.polygon().area(), 15_000.0, epsilon = 1e-3);
}

#[test]
fn rectangle_cut_splits_wall() {
    init_tracing();
    let mut editor = Editor::new(EngineConfig::default());
    let wall =
        WallElement::line(Point2::new(0.0, 50.0), Point2::new(200.0, 50.0), &wall_style()).unwrap();
    let original = editor.add_element(Element::Wall(wall));

    let outcome = editor
        .cut_rectangle(Aabb::from_corners(
            Point2::new(60.0, -10.0),
            Point2::new(90.0, 110.0),
        ))
        .unwrap();
    assert_eq!(outcome.removed, vec![original.clone()]);
    assert!(editor.scene().find(&original).is_none());

    let walls: Vec<Vec<(f64, f64)>> = editor
        .scene()
        .elements
        .iter()
        .filter_map(Element::as_wall)
        .map(|w| w.vertices.iter().map(|p| (p.x, p.y)).collect())
        .collect();
    assert_eq!(
        walls,
        vec![vec![(0.0, 50.0), (60.0, 50.0)], vec![(90.0, 50.0), (200.0, 50.0)]]
    );
    for id in &outcome.added {
        assert_eq!(editor.scene().wall(id).unwrap().wall_thickness, 8.0);
    }

    assert!(editor.undo());
    assert!(editor.scene().find(&original).is_some());
}

#[test]
fn undo_then_commit_discards_redo() {
    init_tracing();
    let mut editor = Editor::new(EngineConfig::default());
    let mut draft = WallDraft::new(wall_style());
    draft.push_point(Point2::new(0.0, 0.0));
    draft.push_point(Point2::new(10.0, 0.0));
    editor.add_element(Element::Wall(draft.finish().unwrap()));
    let snapshot_a = editor.scene().elements.clone();

    let b = editor.add_element(Element::Room(room(0.0, 0.0, 10.0, 10.0)));
    assert!(editor.undo());
    assert_eq!(editor.scene().elements, snapshot_a);
    assert!(editor.history().can_redo());

    let mut draft = RoomDraft::new(room_style());
    for (x, y) in [(20.0, 20.0), (40.0, 20.0), (30.0, 40.0)] {
        draft.push_point(Point2::new(x, y));
    }
    editor.add_element(Element::Room(draft.finish().unwrap()));
    assert!(!editor.history().can_redo());
    assert!(!editor.redo());
    assert!(editor.scene().find(&b).is_none());
}

#[test]
fn merge_keeps_opening_and_round_trips_json() {
    init_tracing();
    let mut a = room(0.0, 0.0, 100.0, 100.0);
    a.wall_openings.push(WallOpening::new(2, 0.25, 0.5).unwrap());
    let b = room(50.0, 0.0, 150.0, 100.0);

    let mut editor = Editor::new(EngineConfig::default());
    let ids = vec![
        editor.add_element(Element::Room(a)),
        editor.add_element(Element::Room(b)),
    ];
    let MergeOutcome::Merged {
        rooms,
        dropped_openings,
        ..
    } = editor.merge_rooms(ids, None).unwrap()
    else {
        panic!("expected merge");
    };
    assert_eq!(dropped_openings, 0);
    let merged = editor.scene().room(&rooms[0]).unwrap();
    assert_eq!(merged.wall_openings.len(), 1);
    assert!(merged.wall_openings[0].is_valid());
    let merged_len = merged.vertices.len();

    editor
        .fill_shape(
            FillMode::Rectangle,
            Aabb::from_corners(Point2::new(0.0, 0.0), Point2::new(300.0, 300.0)),
            40.0,
            "sand.png",
        )
        .unwrap();
    assert_eq!(editor.texture_loaded("sand.png").unwrap(), 1);

    let config = EngineConfig::default();
    let json = editor.scene().to_json().unwrap();
    let back = Scene::from_json(&json, &config).unwrap();
    assert_eq!(back.terrain, editor.scene().terrain);
    assert_eq!(back.elements.len(), 1);
    let restored = back.room(&rooms[0]).unwrap();
    assert_eq!(restored.vertices.len(), merged_len);
    assert_eq!(restored.wall_openings.len(), 1);
}

fn merge_with_offset_floor(offset: f64) -> (Editor, MergeOutcome) {
    let mut a = room(0.0, 0.0, 100.0, 100.0);
    a.wall_openings.push(WallOpening::new(0, 0.4, 0.6).unwrap());
    let b = room(-10.0, -offset, 110.0, 50.0);

    let mut editor = Editor::new(EngineConfig::default());
    let ids = vec![
        editor.add_element(Element::Room(a)),
        editor.add_element(Element::Room(b)),
    ];
    let outcome = editor.merge_rooms(ids, None).unwrap();
    (editor, outcome)
}

#[test]
fn merge_reprojects_openings_within_tolerance() {
    init_tracing();
    let (editor, outcome) = merge_with_offset_floor(4.0);
    let MergeOutcome::Merged {
        rooms,
        dropped_openings,
        ..
    } = outcome
    else {
        panic!("expected merge");
    };
    assert_eq!(dropped_openings, 0);
    let merged = editor.scene().room(&rooms[0]).unwrap();
    assert_eq!(merged.wall_openings.len(), 1);
    let (p, q) = merged.wall_openings[0]
        .world_points(&merged.vertices)
        .unwrap();
    assert_relative_eq!(p.y, -4.0, epsilon = 1e-3);
    assert_relative_eq!(q.y, -4.0, epsilon = 1e-3);
    assert_relative_eq!(p.x.min(q.x), 40.0, epsilon = 1e-3);
    assert_relative_eq!(p.x.max(q.x), 60.0, epsilon = 1e-3);
}

#[test]
fn merge_drops_openings_beyond_tolerance() {
    init_tracing();
    let (editor, outcome) = merge_with_offset_floor(6.0);
    let MergeOutcome::Merged {
        rooms,
        dropped_openings,
        ..
    } = outcome
    else {
        panic!("expected merge");
    };
    assert_eq!(dropped_openings, 1);
    let merged = editor.scene().room(&rooms[0]).unwrap();
    assert!(merged.wall_openings.is_empty());
}
