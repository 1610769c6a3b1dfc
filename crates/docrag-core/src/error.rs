use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No documents found in {}. Add .txt or .pdf files first.", .0.display())]
    EmptySource(PathBuf),

    #[error("Index not found at {}. Run with --build-index first.", .0.display())]
    IndexNotBuilt(PathBuf),

    #[error("Index was built with embedding model '{index}' but the query embedder uses '{query}'. Rebuild the index with --build-index.")]
    ModelMismatch { index: String, query: String },

    #[error("Index at {} is malformed: {reason}", .path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("Query vector has dimension {query}, index vectors have {index}")]
    DimensionMismatch { index: usize, query: usize },

    #[error("Failed to ingest {doc_id}: {reason}")]
    Ingestion { doc_id: String, reason: String },

    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Fatal to the current operation and fixable by the caller (config, missing build step).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_) | Error::EmptySource(_) | Error::IndexNotBuilt(_) | Error::ModelMismatch { .. }
        )
    }

    /// Embedding or chat call failure, including timeouts.
    pub fn is_provider(&self) -> bool {
        matches!(self, Error::Provider(_) | Error::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
