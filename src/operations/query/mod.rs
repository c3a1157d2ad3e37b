mod nearest_edge;
mod pick;

pub use nearest_edge::{EdgeHit, NearestEdge};
pub use pick::PickElement;
