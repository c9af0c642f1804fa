use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("model artifact not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("failed to read model artifact {path}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model artifact: {0}")]
    ModelDecode(#[source] bincode::Error),

    #[error("failed to encode model artifact: {0}")]
    ModelEncode(#[source] bincode::Error),

    #[error("model artifact is not usable: {0}")]
    ModelIncompatible(String),

    #[error("feature vector must have {expected} values, got {actual}")]
    InvalidFeatures { expected: usize, actual: usize },

    /// `line` is the 1-based line of the offending record, when known.
    #[error("failed to load {path} (line {line:?})")]
    DataLoad {
        path: PathBuf,
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("duplicate student_id {0}")]
    DuplicateStudent(String),

    #[error("student {0} not found")]
    StudentNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
