use crate::geometry::GeometryError;
use thiserror::Error;

use super::StackId;

pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("ROI index {index} out of range for {len} ROIs")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown stack id {0}")]
    UnknownStack(StackId),

    #[error("stack width must be at least 1")]
    InvalidWidth,

    #[error("stacks need a slice axis, image has {ndim} dimensions")]
    NoSliceAxis { ndim: usize },

    #[error("position has {found} dimensions, ROIs have {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("shape layer holds {live} shapes but {known} are known; reconcile first")]
    Unreconciled { live: usize, known: usize },

    #[error("shape {index} has invalid geometry")]
    InvalidShape {
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error("inconsistent stack bookkeeping: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
