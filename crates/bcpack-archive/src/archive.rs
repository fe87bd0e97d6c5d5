//! Archive pairs and content extraction.

use std::sync::Arc;

use bcpack_common::{Category, Locale};

use crate::crypto;
use crate::{ArchiveIndex, Content, Error, FileDescriptor, Result};

/// Look up a file by name and decrypt it out of a pack buffer.
///
/// Stateless: the result depends only on the arguments.
pub fn extract(
    index: &ArchiveIndex,
    pack: &[u8],
    locale: Locale,
    category: Category,
    name: &str,
) -> Result<Content> {
    let entry = index
        .get(name)
        .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

    crypto::decrypt_range(locale, category, pack, entry)
}

/// A decoded `.list` index together with its `.pack` buffer.
///
/// Carries the locale and category needed to decrypt entries, so callers
/// never reach for ambient state. Cloning is cheap; buffers are shared.
#[derive(Clone)]
pub struct PackArchive {
    locale: Locale,
    category: Category,
    index: Arc<ArchiveIndex>,
    pack: Arc<[u8]>,
}

impl PackArchive {
    /// Decode a `.list`/`.pack` pair.
    pub fn open(locale: Locale, category: Category, list: &[u8], pack: impl Into<Arc<[u8]>>) -> Result<Self> {
        let index = ArchiveIndex::decode(list)?;
        Ok(Self::from_parts(locale, category, index, pack))
    }

    /// Assemble an archive from an already-decoded index.
    pub fn from_parts(
        locale: Locale,
        category: Category,
        index: ArchiveIndex,
        pack: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            locale,
            category,
            index: Arc::new(index),
            pack: pack.into(),
        }
    }

    /// An archive with no files, standing in for a missing version.
    pub fn empty(locale: Locale, category: Category) -> Self {
        Self::from_parts(locale, category, ArchiveIndex::empty(), Vec::<u8>::new())
    }

    #[inline]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Shared handle to the index.
    #[inline]
    pub fn index_arc(&self) -> Arc<ArchiveIndex> {
        Arc::clone(&self.index)
    }

    /// The raw pack buffer.
    #[inline]
    pub fn pack(&self) -> &[u8] {
        &self.pack
    }

    /// Shared handle to the pack buffer.
    #[inline]
    pub fn pack_arc(&self) -> Arc<[u8]> {
        Arc::clone(&self.pack)
    }

    /// Number of files.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    /// Iterate over entries in index order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &FileDescriptor> + '_ {
        self.index.iter()
    }

    /// Find an entry by exact name.
    pub fn find(&self, name: &str) -> Option<&FileDescriptor> {
        self.index.get(name)
    }

    /// Decrypt a file by name.
    pub fn extract(&self, name: &str) -> Result<Content> {
        extract(&self.index, &self.pack, self.locale, self.category, name)
    }

    /// Decrypt a specific entry.
    pub fn read(&self, entry: &FileDescriptor) -> Result<Content> {
        crypto::decrypt_range(self.locale, self.category, &self.pack, entry)
    }

    /// Raw, still-encrypted bytes of a file.
    pub fn segment(&self, name: &str) -> Result<&[u8]> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        entry.slice(&self.pack)
    }
}

impl std::fmt::Debug for PackArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackArchive")
            .field("locale", &self.locale)
            .field("category", &self.category)
            .field("entries", &self.index.len())
            .field("pack_len", &self.pack.len())
            .finish()
    }
}
