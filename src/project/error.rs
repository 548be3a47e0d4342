use std::path::PathBuf;

use crate::stacks::StackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectError>;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no project record found at {0}")]
    MissingRecord(PathBuf),

    #[error("file `{0}` is not part of the project")]
    UnknownFile(String),

    #[error("invalid project record: {0}")]
    Invalid(String),

    #[error("project I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("project YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("ROI stacks of `{file}` are inconsistent: {source}")]
    Stack {
        file: String,
        #[source]
        source: StackError,
    },
}
