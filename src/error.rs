//! Error types for the oa-replace crate.

use std::path::PathBuf;

/// Replace-engine error types.
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    /// A regex-mode find string did not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The structured payload is missing its text container or is not well-formed.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The document container (zip archive) could not be decoded or rebuilt.
    #[error("archive error: {0}")]
    Archive(String),

    /// File extension is neither plain text nor a Word document.
    #[error("unsupported document format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// File exceeds the configured maximum size.
    #[error("file too large: {path} ({size} bytes, limit {max} bytes)")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// An operation needs a loaded document but the session is empty.
    #[error("no document loaded")]
    NoDocument,

    /// Undo requested without a snapshot.
    #[error("nothing to undo")]
    NothingToUndo,

    /// MCP protocol error.
    #[error("MCP protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<zip::result::ZipError> for ReplaceError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Convenience result type for oa-replace operations.
pub type ReplaceResult<T> = Result<T, ReplaceError>;
