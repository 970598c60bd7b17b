//! Error types for the normalizer.
//!
//! Per-document failures are caught at the document boundary by the batch
//! pipeline; only setup failures (bad arguments, unusable output directory)
//! abort a run.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the normalizer library.
#[derive(Debug, Error)]
pub enum NormalizerError {
    /// Invalid document id format.
    #[error("Invalid document id: '{0}'. Expected lov-YYYY-MM-DD-N or forskrift-YYYY-MM-DD-N")]
    InvalidDocId(String),

    /// Source document cannot be parsed into any tree at all.
    #[error("Malformed source document {}: {source}", path.display())]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// No document identifier derivable by any fallback heuristic.
    #[error("No document identifier derivable for {}", path.display())]
    MissingMetadata { path: PathBuf },

    /// One output format failed to render for one document.
    #[error("Rendering {format} failed for document {id}: {message}")]
    Render {
        id: String,
        format: &'static str,
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (index or canonical form).
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for normalizer operations.
pub type Result<T> = std::result::Result<T, NormalizerError>;
