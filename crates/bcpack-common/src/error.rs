//! Error types for bcpack-common.

use thiserror::Error;

/// Common error type for bcpack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Locale code not among the supported regions.
    #[error("unknown locale: {0} (expected one of JP, TW, EN, KR)")]
    UnknownLocale(String),

    /// Category name not among the known asset categories.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Digest string is not 32 hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
