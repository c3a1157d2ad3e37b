mod aabb;
mod opening;
mod polygon;

pub use aabb::Aabb;
pub use opening::{insert_hole_opening, insert_opening, rescale_span, HoleWallOpening, WallOpening};
pub use polygon::Polygon;

pub(crate) use opening::merge_span;
