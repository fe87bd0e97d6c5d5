//! Index entries.

use std::ops::Range;

use crate::{Error, Result};

/// A named byte range within a pack buffer.
///
/// This is metadata only. Use [`PackArchive::extract`](crate::PackArchive::extract)
/// to get the decrypted contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileDescriptor {
    /// File name within the archive.
    pub name: String,
    /// Offset of the segment in the pack.
    pub start: u64,
    /// Segment length in bytes.
    pub length: u64,
}

impl FileDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, start: u64, length: u64) -> Self {
        Self {
            name: name.into(),
            start,
            length,
        }
    }

    /// Offset one past the last byte of the segment.
    ///
    /// Saturates instead of overflowing on corrupt offsets.
    #[inline]
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    /// File extension: the text after the last `.`, or the whole name when
    /// there is no dot.
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Byte range of the segment, if it fits in a pack of `pack_len` bytes.
    pub fn range(&self, pack_len: usize) -> Option<Range<usize>> {
        let start = usize::try_from(self.start).ok()?;
        let end = usize::try_from(self.end()).ok()?;
        (end <= pack_len).then_some(start..end)
    }

    /// Borrow this segment's raw bytes from a pack buffer.
    pub fn slice<'a>(&self, pack: &'a [u8]) -> Result<&'a [u8]> {
        self.range(pack.len())
            .map(|range| &pack[range])
            .ok_or_else(|| Error::SegmentOutOfRange {
                name: self.name.clone(),
                start: self.start,
                length: self.length,
                pack_len: pack.len(),
            })
    }
}
