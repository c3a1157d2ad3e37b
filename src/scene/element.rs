use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OperationError, Result};
use crate::geometry::{Aabb, HoleWallOpening, Polygon, WallOpening};
use crate::math::polygon_2d::is_finite_ring;
use crate::math::Point2;

use super::serde_points;

/// Opaque element identifier, persisted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generates a fresh id of the form `"{prefix}-{uuid}"`.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", uuid::Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A widget attached to a room. The payload is owned by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Texture and thickness settings shared by rooms created from one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomStyle {
    pub floor_texture_url: String,
    pub wall_texture_url: String,
    pub wall_thickness: f64,
    pub wall_tile_size: f64,
}

/// Texture and thickness settings for new walls.
#[derive(Debug, Clone, PartialEq)]
pub struct WallStyle {
    pub wall_texture_url: String,
    pub wall_thickness: f64,
    pub wall_tile_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomElement {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(with = "serde_points::points")]
    pub vertices: Vec<Point2>,
    #[serde(default, with = "serde_points::rings", skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point2>>,
    #[serde(default)]
    pub wall_openings: Vec<WallOpening>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hole_wall_openings: Vec<HoleWallOpening>,
    pub wall_thickness: f64,
    pub wall_tile_size: f64,
    #[serde(default)]
    pub floor_texture_url: String,
    #[serde(default)]
    pub wall_texture_url: String,
    /// Degrees about the outer ring's bounding-box centre.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub widgets: Vec<Widget>,
}

impl RoomElement {
    /// A rectangular room from a drag gesture.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the rectangle has no area.
    pub fn from_rect(rect: &Aabb, style: &RoomStyle) -> Result<Self> {
        if rect.is_degenerate() {
            return Err(OperationError::InvalidInput("room rectangle has no area".into()).into());
        }
        let vertices = vec![
            rect.min,
            Point2::new(rect.max.x, rect.min.y),
            rect.max,
            Point2::new(rect.min.x, rect.max.y),
        ];
        Self::from_vertices(vertices, style)
    }

    /// A room from a custom vertex sequence.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than three or non-finite vertices.
    pub fn from_vertices(vertices: Vec<Point2>, style: &RoomStyle) -> Result<Self> {
        if vertices.len() < 3 || !is_finite_ring(&vertices) {
            return Err(OperationError::InvalidInput(format!(
                "room needs at least 3 finite vertices, got {}",
                vertices.len()
            ))
            .into());
        }
        Ok(Self {
            id: ElementId::generate("room"),
            name: "Room".to_owned(),
            vertices,
            holes: Vec::new(),
            wall_openings: Vec::new(),
            hole_wall_openings: Vec::new(),
            wall_thickness: style.wall_thickness,
            wall_tile_size: style.wall_tile_size,
            floor_texture_url: style.floor_texture_url.clone(),
            wall_texture_url: style.wall_texture_url.clone(),
            rotation: 0.0,
            z_index: 0,
            widgets: Vec::new(),
        })
    }

    /// Geometry in the room's local (unrotated) frame.
    #[must_use]
    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.vertices.clone(), self.holes.clone())
    }

    /// Geometry with rotation baked in, in world space.
    #[must_use]
    pub fn world_polygon(&self) -> Polygon {
        self.polygon().rotated(self.rotation)
    }

    /// World-space bounding box of the outer ring.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.world_polygon().bounding_box()
    }

    /// Copies every non-geometric attribute from this room onto new geometry.
    #[must_use]
    pub fn with_geometry(&self, id: ElementId, polygon: Polygon) -> Self {
        Self {
            id,
            name: self.name.clone(),
            vertices: polygon.outer,
            holes: polygon.holes,
            wall_openings: Vec::new(),
            hole_wall_openings: Vec::new(),
            wall_thickness: self.wall_thickness,
            wall_tile_size: self.wall_tile_size,
            floor_texture_url: self.floor_texture_url.clone(),
            wall_texture_url: self.wall_texture_url.clone(),
            rotation: 0.0,
            z_index: self.z_index,
            widgets: self.widgets.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallElement {
    pub id: ElementId,
    #[serde(default, with = "serde_points::points", skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Point2>,
    #[serde(default, with = "serde_points::rings", skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Vec<Point2>>,
    pub wall_thickness: f64,
    pub wall_tile_size: f64,
    #[serde(default)]
    pub wall_texture_url: String,
    #[serde(default)]
    pub z_index: i32,
    /// Wall tiles cut through by the eraser, keyed `"{segment}:{edge}:{tile}"`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub transparent_tiles: BTreeSet<String>,
}

impl WallElement {
    /// A wall from a click-chain gesture.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than two or non-finite points.
    pub fn from_chain(vertices: Vec<Point2>, style: &WallStyle) -> Result<Self> {
        if vertices.len() < 2 || !is_finite_ring(&vertices) {
            return Err(OperationError::InvalidInput(format!(
                "wall needs at least 2 finite vertices, got {}",
                vertices.len()
            ))
            .into());
        }
        Ok(Self {
            id: ElementId::generate("wall"),
            vertices,
            segments: Vec::new(),
            wall_thickness: style.wall_thickness,
            wall_tile_size: style.wall_tile_size,
            wall_texture_url: style.wall_texture_url.clone(),
            z_index: 0,
            transparent_tiles: BTreeSet::new(),
        })
    }

    /// A single straight wall from a drag gesture.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the endpoints coincide.
    pub fn line(a: Point2, b: Point2, style: &WallStyle) -> Result<Self> {
        if (b - a).norm() <= f64::EPSILON {
            return Err(OperationError::InvalidInput("wall line has zero length".into()).into());
        }
        Self::from_chain(vec![a, b], style)
    }

    /// The wall's open polylines: `segments` when present, else `vertices`.
    #[must_use]
    pub fn polylines(&self) -> Vec<Vec<Point2>> {
        if self.segments.is_empty() {
            if self.vertices.len() >= 2 {
                vec![self.vertices.clone()]
            } else {
                Vec::new()
            }
        } else {
            self.segments.clone()
        }
    }

    /// A new wall sharing this wall's style with the given single polyline.
    #[must_use]
    pub fn fragment(&self, vertices: Vec<Point2>) -> Self {
        Self {
            id: ElementId::generate("wall"),
            vertices,
            segments: Vec::new(),
            wall_thickness: self.wall_thickness,
            wall_tile_size: self.wall_tile_size,
            wall_texture_url: self.wall_texture_url.clone(),
            z_index: self.z_index,
            transparent_tiles: BTreeSet::new(),
        }
    }
}

/// A point-like element placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub z_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub z_index: i32,
}

/// Scene element, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Room(RoomElement),
    Wall(WallElement),
    Token(TokenElement),
    Annotation(AnnotationElement),
}

impl Element {
    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::Room(r) => &r.id,
            Self::Wall(w) => &w.id,
            Self::Token(t) => &t.id,
            Self::Annotation(a) => &a.id,
        }
    }

    #[must_use]
    pub fn z_index(&self) -> i32 {
        match self {
            Self::Room(r) => r.z_index,
            Self::Wall(w) => w.z_index,
            Self::Token(t) => t.z_index,
            Self::Annotation(a) => a.z_index,
        }
    }

    pub fn set_z_index(&mut self, z: i32) {
        match self {
            Self::Room(r) => r.z_index = z,
            Self::Wall(w) => w.z_index = z,
            Self::Token(t) => t.z_index = z,
            Self::Annotation(a) => a.z_index = z,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Room(_) => "room",
            Self::Wall(_) => "wall",
            Self::Token(_) => "token",
            Self::Annotation(_) => "annotation",
        }
    }

    #[must_use]
    pub fn as_room(&self) -> Option<&RoomElement> {
        match self {
            Self::Room(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_wall(&self) -> Option<&WallElement> {
        match self {
            Self::Wall(w) => Some(w),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn style() -> RoomStyle {
        RoomStyle {
            floor_texture_url: "floor.png".into(),
            wall_texture_url: "wall.png".into(),
            wall_thickness: 10.0,
            wall_tile_size: 50.0,
        }
    }

    #[test]
    fn rect_room_is_ccw_square() {
        let rect = Aabb::from_corners(Point2::new(0.0, 0.0), Point2::new(100.0, 50.0));
        let room = RoomElement::from_rect(&rect, &style()).unwrap();
        assert_eq!(room.vertices.len(), 4);
        assert!(room.id.as_str().starts_with("room-"));
        assert!((room.polygon().area() - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_room_is_rejected() {
        let rect = Aabb::from_corners(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0));
        assert!(RoomElement::from_rect(&rect, &style()).is_err());
        assert!(RoomElement::from_vertices(vec![Point2::new(0.0, 0.0)], &style()).is_err());
    }

    #[test]
    fn wall_polylines_prefer_segments() {
        let wall_style = WallStyle {
            wall_texture_url: "wall.png".into(),
            wall_thickness: 8.0,
            wall_tile_size: 50.0,
        };
        let mut wall =
            WallElement::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), &wall_style).unwrap();
        assert_eq!(wall.polylines().len(), 1);
        wall.segments = vec![
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            vec![Point2::new(5.0, 5.0), Point2::new(6.0, 5.0)],
        ];
        assert_eq!(wall.polylines().len(), 2);
        assert!(WallElement::line(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0), &wall_style).is_err());
    }

    #[test]
    fn element_wire_shape_is_type_tagged() {
        let json = serde_json::json!({
            "type": "wall",
            "id": "wall-1",
            "vertices": [{ "x": 0.0, "y": 50.0 }, { "x": 200.0, "y": 50.0 }],
            "wallThickness": 8.0,
            "wallTileSize": 50.0,
            "wallTextureUrl": "stone.png",
            "zIndex": 3
        });
        let element: Element = serde_json::from_value(json).unwrap();
        assert_eq!(element.kind_name(), "wall");
        assert_eq!(element.z_index(), 3);
        let wall = element.as_wall().unwrap();
        assert_eq!(wall.vertices[1], Point2::new(200.0, 50.0));

        let back = serde_json::to_value(&element).unwrap();
        assert_eq!(back["type"], "wall");
        assert!(back.get("segments").is_none());
    }
}
