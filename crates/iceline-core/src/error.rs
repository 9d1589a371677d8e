use thiserror::Error;

/// Errors surfaced by raster loading, parameter validation and queries.
///
/// Stage functions themselves never fail; every error here is raised at the
/// controller boundary before or after the pure pipeline runs.
#[derive(Debug, Error)]
pub enum ClimateError {
    #[error("raster load failed: {0}")]
    RasterLoad(String),

    #[error("raster is {width}×{height} but holds {len} samples")]
    RasterShape { width: usize, height: usize, len: usize },

    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("world is not ready: no raster has been loaded")]
    NotReady,

    #[error("cell {index} is outside a grid of {len} cells")]
    CellOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ClimateError>;
