//! Error types for the corpus reader.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the corpus library.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// No document with the requested id.
    #[error("No document with id '{id}' in the corpus")]
    NotFound { id: String },

    /// The corpus root does not exist or holds no corpus.
    #[error("No corpus found at {}", root.display())]
    MissingIndex { root: PathBuf },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;
