use thiserror::Error;

/// Top-level error type for the battle-map geometry engine.
#[derive(Debug, Error)]
pub enum BattlemapError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error("scene serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("ratio {parameter} = {value} is out of range [{min}, {max}]")]
    RatioOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),
}

/// Errors related to scene-mutating operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("element {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors related to the terrain tile store.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("malformed tile key {0:?}")]
    InvalidTileKey(String),

    #[error("invalid brush: {0}")]
    InvalidBrush(String),

    #[error("unknown fill request")]
    UnknownFillRequest,
}

/// Convenience type alias for results using [`BattlemapError`].
pub type Result<T> = std::result::Result<T, BattlemapError>;
