//! Common types for bcpack.
//!
//! This crate provides the vocabulary shared by all bcpack crates:
//!
//! - [`Locale`] - the four regional archive variants
//! - [`Category`] - the asset category an archive pair belongs to
//! - [`digest`] - MD5 content digests used for change detection

mod category;
mod error;
mod locale;

pub mod digest;

pub use category::Category;
pub use digest::Digest;
pub use error::{Error, Result};
pub use locale::Locale;
