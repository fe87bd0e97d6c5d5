//! Retrieval of `.list`/`.pack` archive pairs.
//!
//! Archives live at `{locale}/{version}/{category}.{list,pack}`, either on a
//! static HTTP server or in a local mirror directory. Both sources implement
//! [`Fetcher`].
//!
//! # Example
//!
//! ```no_run
//! use bcpack_common::{Category, Locale};
//! use bcpack_fetch::{from_source, ArchiveKey, FetchConfig};
//!
//! # async fn run() -> bcpack_fetch::Result<()> {
//! let fetcher = from_source("https://example.com/bc", FetchConfig::default())?;
//! let key = ArchiveKey::new(Locale::Jp, "13.1.0", Category::DataLocal);
//! let pair = fetcher.fetch_pair(&key).await?;
//! println!("{} list bytes, {} pack bytes", pair.list.len(), pair.pack.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod fetcher;
mod key;

pub use error::{FetchError, Result};
pub use fetcher::{from_source, DirFetcher, FetchConfig, Fetcher, HttpFetcher};
pub use key::{ArchiveKey, RawPair, ResourceKind};
