//! Error type for the umbrella crate.

use thiserror::Error;

/// Errors surfaced by [`Session`](crate::Session) queries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] bcpack_common::Error),

    #[error(transparent)]
    Archive(#[from] bcpack_archive::Error),

    #[error(transparent)]
    Diff(#[from] bcpack_diff::Error),

    #[error(transparent)]
    Fetch(#[from] bcpack_fetch::FetchError),

    /// The file exists in neither loaded version.
    #[error("file not found in either version: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
