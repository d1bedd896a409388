use thiserror::Error;

use crate::detector::Direction;

/// Top-level error type for the portal navigation core.
#[derive(Debug, Error)]
pub enum PortalNavError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the detector volume tree.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid volume hierarchy: {0}")]
    InvalidHierarchy(String),
}

/// Errors raised while assembling the portal graph.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Both portals already resolve the same direction to different volumes.
    #[error("cannot fuse portals: both sides resolve {direction:?} to different volumes")]
    FusionConflict { direction: Direction },

    #[error("invalid volume binning: {0}")]
    InvalidBinning(String),
}

/// Errors related to building the spatial index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid index parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience type alias for results using [`PortalNavError`].
pub type Result<T> = std::result::Result<T, PortalNavError>;
