//! `.list` index decoding.
//!
//! A decrypted index is newline-separated text:
//!
//! ```text
//! <sentinel>
//! name,start,length
//! name,start,length
//! <sentinel>
//! ```
//!
//! The first and last lines are written by the packer and never describe a
//! file; they are dropped unconditionally. In practice the first line is a
//! row count and the last is the empty string after the final newline.

use std::collections::HashMap;

use tracing::warn;

use crate::crypto;
use crate::{FileDescriptor, Result};

/// A row that could not be parsed into a [`FileDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkippedRow {
    /// 1-based line number in the decrypted text.
    pub line: usize,
    /// The raw row.
    pub text: String,
}

/// Ordered file table of one archive.
///
/// Immutable once decoded.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: Vec<FileDescriptor>,
    /// Name -> position; duplicate names resolve to the last row.
    lookup: HashMap<String, usize>,
    skipped: Vec<SkippedRow>,
}

impl ArchiveIndex {
    /// An index with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decrypt and parse `.list` bytes.
    pub fn decode(cipher: &[u8]) -> Result<Self> {
        let text = crypto::decrypt_list(cipher)?;
        Ok(Self::parse(&text))
    }

    /// Parse already-decrypted index text.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let rows = match lines.len() {
            0..=2 => &[][..],
            n => &lines[1..n - 1],
        };

        let mut entries = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();

        for (offset, row) in rows.iter().enumerate() {
            // +1 for the leading sentinel, +1 for 1-based numbering.
            let line = offset + 2;
            match parse_row(row) {
                Some(entry) => entries.push(entry),
                None => {
                    warn!(line, row = %row, "skipping malformed index row");
                    skipped.push(SkippedRow {
                        line,
                        text: row.to_string(),
                    });
                }
            }
        }

        Self::from_entries_with_skipped(entries, skipped)
    }

    /// Build an index from descriptors directly.
    pub fn from_entries(entries: Vec<FileDescriptor>) -> Self {
        Self::from_entries_with_skipped(entries, Vec::new())
    }

    fn from_entries_with_skipped(entries: Vec<FileDescriptor>, skipped: Vec<SkippedRow>) -> Self {
        let lookup = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        Self {
            entries,
            lookup,
            skipped,
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in index order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, FileDescriptor> {
        self.entries.iter()
    }

    /// Entries in index order.
    #[inline]
    pub fn entries(&self) -> &[FileDescriptor] {
        &self.entries
    }

    /// Find an entry by exact name.
    pub fn get(&self, name: &str) -> Option<&FileDescriptor> {
        self.lookup.get(name).map(|&i| &self.entries[i])
    }

    /// Position of an entry by exact name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Whether an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Rows dropped as malformed while parsing.
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }
}

impl<'a> IntoIterator for &'a ArchiveIndex {
    type Item = &'a FileDescriptor;
    type IntoIter = std::slice::Iter<'a, FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse `name,start,length`. Extra fields are ignored.
fn parse_row(row: &str) -> Option<FileDescriptor> {
    let mut fields = row.split(',');
    let name = fields.next()?;
    let start = fields.next()?.trim().parse().ok()?;
    let length = fields.next()?.trim().parse().ok()?;

    Some(FileDescriptor::new(name, start, length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixture, Error};

    #[test]
    fn test_sentinels_dropped() {
        let index = ArchiveIndex::parse("SENTINEL\nfoo.png,0,10\nbar.txt,10,5\nEND\n");

        assert_eq!(
            index.entries(),
            &[
                FileDescriptor::new("foo.png", 0, 10),
                FileDescriptor::new("bar.txt", 10, 5),
            ]
        );
    }

    #[test]
    fn test_packer_layout() {
        let index = ArchiveIndex::parse("2\nunit001.csv,0,32\nunit002.csv,32,48\n");

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("unit002.csv"), Some(&FileDescriptor::new("unit002.csv", 32, 48)));
        assert!(index.skipped().is_empty());
    }

    #[test]
    fn test_last_line_dropped_even_when_data() {
        let index = ArchiveIndex::parse("2\na.csv,0,16\nb.csv,16,16");

        assert_eq!(index.len(), 1);
        assert!(index.contains("a.csv"));
        assert!(!index.contains("b.csv"));
    }

    #[test]
    fn test_short_inputs() {
        assert!(ArchiveIndex::parse("").is_empty());
        assert!(ArchiveIndex::parse("0").is_empty());
        assert!(ArchiveIndex::parse("0\n").is_empty());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let index = ArchiveIndex::parse("4\nok.csv,0,16\nbad.csv,x,16\nshort.csv,16\nok2.csv,16,16\n");

        let names: Vec<_> = index.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ok.csv", "ok2.csv"]);
        assert_eq!(
            index.skipped(),
            &[
                SkippedRow { line: 3, text: "bad.csv,x,16".to_string() },
                SkippedRow { line: 4, text: "short.csv,16".to_string() },
            ]
        );
    }

    #[test]
    fn test_numeric_fields_trimmed() {
        let index = ArchiveIndex::parse("1\r\nwin.csv,0,16\r\n");

        assert_eq!(index.get("win.csv"), Some(&FileDescriptor::new("win.csv", 0, 16)));
    }

    #[test]
    fn test_duplicate_names_resolve_to_last() {
        let index = ArchiveIndex::parse("2\ndup.csv,0,16\ndup.csv,16,32\n");

        assert_eq!(index.len(), 2);
        assert_eq!(index.position("dup.csv"), Some(1));
        assert_eq!(index.get("dup.csv").unwrap().start, 16);
    }

    #[test]
    fn test_decode_encrypted() {
        let cipher = fixture::encrypt_list("2\nfoo.png,0,10\nbar.txt,10,5\n");
        let index = ArchiveIndex::decode(&cipher).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.entries()[0], FileDescriptor::new("foo.png", 0, 10));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(ArchiveIndex::decode(&[1, 2, 3]), Err(Error::Decode(_))));
    }
}
