pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod math;
pub mod operations;
pub mod scene;
pub mod terrain;

pub use error::{BattlemapError, Result};
