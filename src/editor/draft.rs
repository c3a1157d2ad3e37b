use crate::error::Result;
use crate::math::Point2;
use crate::scene::{RoomElement, RoomStyle, WallElement, WallStyle};

/// Vertices of a room being clicked out point by point.
///
/// Nothing reaches the scene until [`finish`](Self::finish); dropping the
/// draft abandons the gesture.
#[derive(Debug, Clone)]
pub struct RoomDraft {
    points: Vec<Point2>,
    style: RoomStyle,
}

impl RoomDraft {
    #[must_use]
    pub fn new(style: RoomStyle) -> Self {
        Self {
            points: Vec::new(),
            style,
        }
    }

    pub fn push_point(&mut self, point: Point2) {
        self.points.push(point);
    }

    /// Removes the most recent point.
    pub fn undo_point(&mut self) -> Option<Point2> {
        self.points.pop()
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Builds the room.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than three points.
    pub fn finish(self) -> Result<RoomElement> {
        RoomElement::from_vertices(self.points, &self.style)
    }
}

/// Vertices of a wall chain being clicked out.
#[derive(Debug, Clone)]
pub struct WallDraft {
    points: Vec<Point2>,
    style: WallStyle,
}

impl WallDraft {
    #[must_use]
    pub fn new(style: WallStyle) -> Self {
        Self {
            points: Vec::new(),
            style,
        }
    }

    pub fn push_point(&mut self, point: Point2) {
        self.points.push(point);
    }

    pub fn undo_point(&mut self) -> Option<Point2> {
        self.points.pop()
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Builds the wall.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than two points.
    pub fn finish(self) -> Result<WallElement> {
        WallElement::from_chain(self.points, &self.style)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn room_draft_needs_three_points() {
        let style = RoomStyle {
            floor_texture_url: String::new(),
            wall_texture_url: String::new(),
            wall_thickness: 10.0,
            wall_tile_size: 50.0,
        };
        let mut draft = RoomDraft::new(style);
        draft.push_point(Point2::new(0.0, 0.0));
        draft.push_point(Point2::new(10.0, 0.0));
        assert!(draft.clone().finish().is_err());

        draft.push_point(Point2::new(99.0, 99.0));
        assert_eq!(draft.undo_point(), Some(Point2::new(99.0, 99.0)));
        draft.push_point(Point2::new(10.0, 10.0));
        let room = draft.finish().unwrap();
        assert_eq!(room.vertices.len(), 3);
    }

    #[test]
    fn wall_draft_builds_chain() {
        let style = WallStyle {
            wall_texture_url: "w.png".into(),
            wall_thickness: 8.0,
            wall_tile_size: 50.0,
        };
        let mut draft = WallDraft::new(style);
        draft.push_point(Point2::new(0.0, 0.0));
        assert!(draft.clone().finish().is_err());
        draft.push_point(Point2::new(10.0, 0.0));
        draft.push_point(Point2::new(10.0, 10.0));
        assert_eq!(draft.points().len(), 3);
        assert_eq!(draft.finish().unwrap().polylines()[0].len(), 3);
    }
}
