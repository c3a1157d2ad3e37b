mod group;
mod merge;
mod subtract;

pub use group::group_by_overlap;
pub use merge::{MergeOutcome, MergeRooms, WidgetConflict, WidgetResolution};
pub use subtract::{SubtractOutcome, SubtractRoom};
