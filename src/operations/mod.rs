pub mod boolean;
pub mod query;
pub mod rooms;
pub mod walls;
