//! Error types for archive fetching.

use thiserror::Error;

/// Errors that can occur while fetching archive files.
///
/// Every variant means "no archive for this version" to callers; none of
/// them is fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The resource does not exist, or the server answered with an HTML
    /// error page instead of archive bytes.
    #[error("archive resource not found: {resource}")]
    NotFound { resource: String },

    /// The server answered with an unexpected status.
    #[error("unexpected status {status} for {resource}")]
    Status { resource: String, status: u16 },

    /// The fetch did not finish within the configured timeout.
    #[error("fetch of {resource} timed out after {duration_ms}ms")]
    Timeout { resource: String, duration_ms: u64 },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether the archive is simply absent (as opposed to unreachable).
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
