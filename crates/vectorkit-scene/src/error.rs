//! Error types for the persistence contract.

use thiserror::Error;

/// Failure while saving or restoring a document.
///
/// Restore is atomic: any of these errors means no scene was constructed.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown corner type code '{0}'")]
    UnknownCornerType(String),

    #[error("unknown node kind '{0}'")]
    UnknownNodeKind(String),

    #[error("node kind '{0}' is not allowed under '{1}'")]
    InvalidChild(String, String),

    #[error("path node is missing its point data")]
    MissingPathData,
}
