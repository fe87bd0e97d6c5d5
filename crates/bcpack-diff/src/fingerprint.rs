//! Segment fingerprints.
//!
//! Fingerprints are MD5 digests of the raw, still-encrypted segment bytes.
//! Hashing ciphertext avoids needing locale keys while diffing, at the cost
//! of reporting a file as modified when it was merely re-encrypted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use bcpack_archive::FileDescriptor;
use bcpack_common::Digest;
use parking_lot::RwLock;

use crate::Result;

/// Digest of a file's raw byte range within a pack buffer.
#[inline]
pub fn fingerprint(pack: &[u8], entry: &FileDescriptor) -> Result<Digest> {
    Ok(Digest::of(entry.slice(pack)?))
}

/// Per-version fingerprint cache.
///
/// Entries are keyed by `(file name, generation)`. [`invalidate`](Self::invalidate)
/// bumps the generation and drops everything, so a digest computed against an
/// old index can never be served for a new one.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    generation: AtomicU64,
    entries: RwLock<HashMap<(String, u64), Digest>>,
    computed: AtomicUsize,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Forget every cached digest. Call whenever the underlying index changes.
    pub fn invalidate(&self) -> u64 {
        let mut entries = self.entries.write();
        entries.clear();
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Cached digest for a name in the current generation.
    pub fn get(&self, name: &str) -> Option<Digest> {
        let key = (name.to_string(), self.generation());
        self.entries.read().get(&key).copied()
    }

    /// Return the cached digest, or compute and cache it.
    pub fn get_or_compute(&self, pack: &[u8], entry: &FileDescriptor) -> Result<Digest> {
        let generation = self.generation();
        let key = (entry.name.clone(), generation);

        if let Some(digest) = self.entries.read().get(&key) {
            return Ok(*digest);
        }

        let digest = fingerprint(pack, entry)?;
        self.computed.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write();
        // An invalidation may have raced with the computation.
        if self.generation() == generation {
            entries.insert(key, digest);
        }

        Ok(digest)
    }

    /// Number of cached digests.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total digests computed (cache misses) over the cache's lifetime.
    pub fn computed(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }
}
