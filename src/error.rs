use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures the pipeline distinguishes between.
///
/// Document-scoped variants (`MissingInput`, `DocumentParse`, `DocumentTimeout`) are
/// absorbed at the document task boundary; everything else fails the collection.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("input document not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to extract layout from {}: {reason}", path.display())]
    DocumentParse { path: PathBuf, reason: String },

    #[error("{} exceeded its processing budget of {budget:?}", path.display())]
    DocumentTimeout { path: PathBuf, budget: Duration },

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("invalid collection input {}: {reason}", path.display())]
    InvalidCollection { path: PathBuf, reason: String },

    #[error("failed to start document workers: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = AnalyzerError> = std::result::Result<T, E>;
