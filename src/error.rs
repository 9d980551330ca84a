//! Error types for document operations.

use thiserror::Error;

/// Errors surfaced by the document model and service.
///
/// Every error is scoped to a single request. None of them leave a partially
/// applied batch behind.
#[derive(Debug, Error)]
pub enum DocsError {
    /// No document is stored under the given id.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// The request payload could not be decoded or is semantically empty.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// An insert index or delete range falls outside the document.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Snapshot encode/decode failure.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A snapshot decoded but violates the body invariants.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl DocsError {
    /// HTTP-equivalent status for the caller to report.
    pub fn status_code(&self) -> u16 {
        match self {
            DocsError::DocumentNotFound(_) => 404,
            DocsError::MalformedRequest(_) | DocsError::InvalidRange(_) => 400,
            DocsError::Serialization(_) | DocsError::CorruptSnapshot(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
