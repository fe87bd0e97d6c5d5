//! bcpack - inspection and version diffing of encrypted game asset archives.
//!
//! This crate ties the bcpack library crates together and adds [`Session`],
//! which tracks a version selection, loads both archives, and keeps the
//! merged change list current.
//!
//! # Crates
//!
//! - [`bcpack_common`] - locales, asset categories, MD5 digests
//! - [`bcpack_archive`] - `.list` index decoding and `.pack` segment decryption
//! - [`bcpack_diff`] - fingerprint-based version merging and line diffs
//! - [`bcpack_fetch`] - archive retrieval over HTTP or from a local mirror
//!
//! # Example
//!
//! ```no_run
//! use bcpack::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = from_source("https://example.com/bc", FetchConfig::default())?;
//! let mut session = Session::new(fetcher);
//!
//! let selection = Selection::new(Locale::Jp, "13.0.0", Category::DataLocal)
//!     .with_compared("13.1.0");
//! session.refresh(selection).await;
//!
//! for file in session.merged() {
//!     println!("{} {}", file.label.marker(), file.name());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod session;

pub use bcpack_archive as archive;
pub use bcpack_common as common;
pub use bcpack_diff as diff;
pub use bcpack_fetch as fetch;

pub use error::{Error, Result};
pub use session::{FileDiff, LoadTicket, Loaded, Selection, Session, SessionEvent, Slot};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::session::{FileDiff, Selection, Session, SessionEvent, Slot};
    pub use bcpack_archive::{ArchiveIndex, Content, FileDescriptor, PackArchive};
    pub use bcpack_common::{Category, Digest, Locale};
    pub use bcpack_diff::{
        diff_lines, merge, FingerprintCache, Label, LabeledFile, LineDiff, ListFilter,
        MergeSummary,
    };
    pub use bcpack_fetch::{from_source, ArchiveKey, FetchConfig, Fetcher};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
