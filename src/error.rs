//! Error types for the ingestion pipeline
//!
//! Typed errors flow between the internal extraction and splitting helpers.
//! The public adapter entry points swallow them at the boundary: failures are
//! logged and surfaced as empty (or partial) result sets, so callers check
//! for emptiness rather than catching errors. The one exception is strict
//! directory loading, which propagates the first per-file failure.

use thiserror::Error;

/// Result type for the pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error
#[derive(Debug, Error)]
pub enum Error {
    /// Input file does not exist
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Input directory does not exist
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// A file could not be parsed into records
    #[error("failed to parse {file}: {reason}")]
    FileParse { file: String, reason: String },

    /// Chunking strategy name not recognized
    #[error("unknown chunking strategy: {0}")]
    UnknownStrategy(String),

    /// A splitter could not be constructed from the given parameters
    #[error("splitter construction failed: {0}")]
    SplitterConstruction(String),

    /// Embedding provider failure
    #[error("embedding error: {0}")]
    Embedding(String),

    /// HTTP transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileParse {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}
