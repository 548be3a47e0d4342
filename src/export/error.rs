use crate::formats::IoError;
use crate::model::CoreError;
use crate::stacks::{StackError, StackId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("stack {stack} of `{file}` reached at ROI {index}, but its first member is {first:?}")]
    StackOrder {
        file: String,
        stack: StackId,
        index: usize,
        first: Option<usize>,
    },

    #[error("stack slices {0:?} are not consecutive")]
    NonContiguousStack(Vec<usize>),

    #[error("coordinate {value} lies outside axis {axis} of size {size}")]
    OutOfBounds { axis: usize, value: f64, size: usize },

    #[error("crop along axis {axis} is empty")]
    EmptyCrop { axis: usize },

    #[error("expected {expected} dimensions, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("image shape {image:?} does not match annotation shape {labels:?}")]
    ShapeMismatch {
        image: Vec<usize>,
        labels: Vec<usize>,
    },

    #[error("channel `{channel}` not found in `{file}`")]
    UnknownChannel { file: String, channel: String },

    #[error("export I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("export table failure: {0}")]
    Csv(#[from] csv::Error),

    #[error("export image failure: {0}")]
    Image(#[from] IoError),

    #[error("ROI bookkeeping failure: {0}")]
    Stack(#[from] StackError),

    #[error("cropped dataset is invalid: {0}")]
    Core(#[from] CoreError),

    #[error("export settings YAML failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("export settings JSON failure: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
