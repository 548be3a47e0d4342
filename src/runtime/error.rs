use crate::export::ExportError;
use crate::formats::IoError;
use crate::model::CoreError;
use crate::project::ProjectError;
use crate::stacks::StackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("dataset error: {0}")]
    Dataset(#[from] CoreError),

    #[error("image I/O error: {0}")]
    Io(#[from] IoError),

    #[error("ROI stack error: {0}")]
    Stack(#[from] StackError),

    #[error("project error: {0}")]
    Project(#[from] ProjectError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("ROI table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("`{file}` has {found} dimensions but the project uses {expected}")]
    Dimensionality {
        file: String,
        expected: usize,
        found: usize,
    },

    #[error("no file is open")]
    NoOpenFile,

    #[error("channel `{channel}` not found in `{file}`")]
    UnknownChannel { file: String, channel: String },
}
