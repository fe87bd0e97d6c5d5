//! Error types for the archive crate.

use thiserror::Error;

/// Errors that can occur when reading `.list`/`.pack` archives.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] bcpack_common::Error),

    /// The index ciphertext could not be turned into plaintext.
    #[error("index decode error: {0}")]
    Decode(String),

    /// A pack segment could not be decrypted.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Entry not found in the index.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Descriptor points past the end of the pack buffer.
    #[error("segment {name} ({start}+{length}) exceeds pack size {pack_len}")]
    SegmentOutOfRange {
        name: String,
        start: u64,
        length: u64,
        pack_len: usize,
    },
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
