use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("ROI needs 4 corners of at least 2 coordinates, got {0} values")]
    InvalidLength(usize),

    #[error("ROI dimensionality mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("ROI coordinate is not finite: {0}")]
    NonFinite(f64),
}
