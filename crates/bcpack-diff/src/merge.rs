//! Version merging.
//!
//! Combines the indexes of a base version (A) and a compared version (B) into
//! one labeled file list ordered by A's order, then B-only names in B's order.

use std::collections::HashSet;

use bcpack_archive::{ArchiveIndex, FileDescriptor, PackArchive};
use tracing::{debug, error, warn};

use crate::fingerprint::FingerprintCache;
use crate::{Label, LabeledFile};

/// One version's view for merging: its index, raw pack, and digest cache.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub index: &'a ArchiveIndex,
    pub pack: &'a [u8],
    pub cache: &'a FingerprintCache,
}

impl<'a> Side<'a> {
    pub fn new(index: &'a ArchiveIndex, pack: &'a [u8], cache: &'a FingerprintCache) -> Self {
        Self { index, pack, cache }
    }

    /// View an opened archive.
    pub fn of(archive: &'a PackArchive, cache: &'a FingerprintCache) -> Self {
        Self::new(archive.index(), archive.pack(), cache)
    }
}

/// Label counts of a merged list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MergeSummary {
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl MergeSummary {
    pub fn of(files: &[LabeledFile]) -> Self {
        files.iter().fold(Self::default(), |mut summary, file| {
            match file.label {
                Label::Unchanged => summary.unchanged += 1,
                Label::Added => summary.added += 1,
                Label::Removed => summary.removed += 1,
                Label::Modified => summary.modified += 1,
            }
            summary
        })
    }

    /// Number of files that differ in any way.
    pub fn changed(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Every name in A's order, followed by names only B has, in B's order.
pub fn name_universe<'a>(a: &'a ArchiveIndex, b: &'a ArchiveIndex) -> Vec<&'a str> {
    let mut seen = HashSet::with_capacity(a.len() + b.len());
    a.iter()
        .chain(b.iter())
        .map(|entry| entry.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

/// Merge two versions into a labeled file list.
///
/// - B empty: every A file is `unchanged`.
/// - A empty: every B file is `added`.
/// - Otherwise names only in A are `removed`, names only in B are `added`, and
///   shared names are `modified` when their fingerprints differ.
///
/// A file whose fingerprint cannot be computed is logged and left
/// `unchanged`; the merge itself never fails.
pub fn merge(a: Side<'_>, b: Side<'_>) -> Vec<LabeledFile> {
    if b.index.is_empty() {
        return label_all(a.index, Label::Unchanged);
    }

    if a.index.is_empty() {
        return label_all(b.index, Label::Added);
    }

    let names = name_universe(a.index, b.index);
    debug!(files = names.len(), "merging versions");

    classify_all(&names, a, b)
}

fn label_all(index: &ArchiveIndex, label: Label) -> Vec<LabeledFile> {
    index
        .iter()
        .map(|entry| LabeledFile::new(entry.clone(), label))
        .collect()
}

// Both paths map by position, so output order always equals `names` order.
#[cfg(feature = "parallel")]
fn classify_all(names: &[&str], a: Side<'_>, b: Side<'_>) -> Vec<LabeledFile> {
    use rayon::prelude::*;

    names.par_iter().map(|name| classify(name, a, b)).collect()
}

#[cfg(not(feature = "parallel"))]
fn classify_all(names: &[&str], a: Side<'_>, b: Side<'_>) -> Vec<LabeledFile> {
    names.iter().map(|name| classify(name, a, b)).collect()
}

fn classify(name: &str, a: Side<'_>, b: Side<'_>) -> LabeledFile {
    match (a.index.get(name), b.index.get(name)) {
        (None, Some(entry)) => LabeledFile::new(entry.clone(), Label::Added),
        (Some(entry), None) => LabeledFile::new(entry.clone(), Label::Removed),
        (Some(ours), Some(theirs)) => {
            LabeledFile::new(ours.clone(), compare(ours, a, theirs, b))
        }
        (None, None) => {
            error!(name, "file in neither version during merge");
            LabeledFile::new(FileDescriptor::new(name, 0, 0), Label::Unchanged)
        }
    }
}

fn compare(ours: &FileDescriptor, a: Side<'_>, theirs: &FileDescriptor, b: Side<'_>) -> Label {
    let digests = a
        .cache
        .get_or_compute(a.pack, ours)
        .and_then(|left| Ok((left, b.cache.get_or_compute(b.pack, theirs)?)));

    match digests {
        Ok((left, right)) if left == right => Label::Unchanged,
        Ok(_) => Label::Modified,
        Err(e) => {
            warn!(name = %ours.name, error = %e, "fingerprint failed, assuming unchanged");
            Label::Unchanged
        }
    }
}
