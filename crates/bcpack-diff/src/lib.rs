//! Version and line diffing for `.list`/`.pack` archives.
//!
//! - [`merge`] - classify every file of two versions as added, removed,
//!   modified or unchanged using raw-segment fingerprints
//! - [`FingerprintCache`] - per-version digest cache with generation-based
//!   invalidation
//! - [`diff_lines`] / [`LineDiff`] - positional line diff of decoded text
//! - [`ListFilter`] - keyword/label filtering of merged lists
//!
//! # Example
//!
//! ```no_run
//! use bcpack_archive::PackArchive;
//! use bcpack_common::{Category, Locale};
//! use bcpack_diff::{merge, FingerprintCache, Side};
//!
//! # fn open(v: &str) -> PackArchive { PackArchive::empty(Locale::Jp, Category::DataLocal) }
//! let (old, new) = (open("13.0.0"), open("13.1.0"));
//! let (old_cache, new_cache) = (FingerprintCache::new(), FingerprintCache::new());
//!
//! for file in merge(Side::of(&old, &old_cache), Side::of(&new, &new_cache)) {
//!     println!("{} {}", file.label.marker(), file.name());
//! }
//! ```

mod error;
mod filter;
mod label;

pub mod fingerprint;
pub mod lines;
pub mod merge;

pub use error::{Error, Result};
pub use filter::ListFilter;
pub use fingerprint::{fingerprint, FingerprintCache};
pub use label::{Label, LabeledFile};
pub use lines::{diff_lines, DiffKind, DiffLine, LineDiff};
pub use merge::{merge, name_universe, MergeSummary, Side};
