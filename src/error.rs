use thiserror::Error;

use crate::core::document::DocumentId;

/// Failure from the remote document API, classified for retry handling.
///
/// Payloads are plain strings/scalars so results carrying these can be
/// cloned through the shared in-flight save map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("server error (HTTP {0})")]
    Server(u16),

    #[error("authentication expired")]
    AuthExpired,

    #[error("name conflict: {0}")]
    Conflict(String),

    #[error("not found on backend: {0}")]
    NotFound(String),

    #[error("backend rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    /// Transient failures eligible for bounded automatic retry. Everything
    /// else is terminal and must be surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::Server(_))
    }
}

/// Failure from the local store. Always fatal to the operation that hit it;
/// there is no fallback beneath the local store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("store io error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("corrupt store entry {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Failure surfaced by the document service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("document name must not be empty")]
    EmptyName,

    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] ApiError),
}
