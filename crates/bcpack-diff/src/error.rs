//! Error types for the diff crate.

use thiserror::Error;

/// Errors that can occur while diffing archives.
#[derive(Debug, Error)]
pub enum Error {
    /// Archive error.
    #[error("{0}")]
    Archive(#[from] bcpack_archive::Error),

    /// Label name not recognized.
    #[error("unknown label: {0} (expected unchanged, added, removed or modified)")]
    UnknownLabel(String),
}

/// Result type for diff operations.
pub type Result<T> = std::result::Result<T, Error>;
