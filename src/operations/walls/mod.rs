mod cut;
mod erase;
mod merge;
mod tiles;

pub use cut::{CutOutcome, CutRectangle};
pub use erase::{EraseAt, EraseOutcome};
pub use merge::MergeWalls;
