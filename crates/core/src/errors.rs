//! Error types shared across the churn pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data, encoding, training, or
/// persisting a model. Nothing here is caught internally; a failure aborts
/// the current interaction and surfaces to the caller.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// The dataset contains no rows
    #[error("dataset is empty")]
    EmptyDataset,

    /// A categorical value was not observed when the encoding table was fitted
    #[error("unseen category {value:?} for column {column}")]
    UnseenCategory { column: String, value: String },

    /// Training preconditions violated or training itself failed
    #[error("training failed: {0}")]
    Training(String),

    /// No persisted model artifact exists yet
    #[error("model artifact not found at {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// The input file does not match the expected column schema
    #[error("dataset schema error: {0}")]
    Schema(String),

    /// A loaded or constructed model failed structural validation
    #[error("model validation failed: {0}")]
    InvalidModel(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for churn pipeline operations
pub type Result<T> = std::result::Result<T, ChurnError>;
