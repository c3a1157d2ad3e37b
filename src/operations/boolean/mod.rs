mod intersections;
mod openings;
mod overlay;

pub use intersections::{add_cross_segment_vertices, add_intersection_vertices};
pub use openings::{reproject_openings, ReprojectedOpenings};
pub use overlay::{difference_polygon, union_polygons, BooleanOp};
