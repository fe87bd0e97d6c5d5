//! Reader for encrypted `.list`/`.pack` game asset archives.
//!
//! An archive ships as two files per (locale, version, category):
//!
//! - `.list` - an AES-128-ECB encrypted index of `name,start,length` rows
//! - `.pack` - the concatenated file segments the index points into, each
//!   AES-128-CBC encrypted with a locale key (a few text formats under
//!   `ImageDataLocal` are stored in the clear)
//!
//! # Example
//!
//! ```no_run
//! use bcpack_archive::PackArchive;
//! use bcpack_common::{Category, Locale};
//!
//! let list = std::fs::read("DataLocal.list")?;
//! let pack = std::fs::read("DataLocal.pack")?;
//! let archive = PackArchive::open(Locale::Jp, Category::DataLocal, &list, pack)?;
//!
//! for entry in archive.iter() {
//!     println!("{}: {} bytes", entry.name, entry.length);
//! }
//!
//! let content = archive.extract("unitbuy.csv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod content;
mod entry;
mod error;
mod index;

pub mod crypto;

#[cfg(any(test, feature = "test-util"))]
pub mod fixture;

pub use archive::{extract, PackArchive};
pub use content::Content;
pub use entry::FileDescriptor;
pub use error::{Error, Result};
pub use index::{ArchiveIndex, SkippedRow};
