// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded LRU cache of compiled chapter indices.
//!
//! Building a `ChapterIndex` means loading and parsing JSON and normalizing
//! every block, so consecutive searches over the same guide should not pay
//! for it twice. The cache keeps the most recently *touched* chapters: a
//! `get` refreshes recency just like a `put` does.
//!
//! Keys include the `SearchFlags`. Blocks are normalized under one flag set
//! and are useless under another, so toggling case or accent sensitivity
//! builds a fresh entry instead of serving stale folds.
//!
//! All bookkeeping happens under one `parking_lot::Mutex`. The lock is never
//! held while an index is being built, so a slow loader does not stall
//! readers of other chapters.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::debug;
use lru::LruCache;
use parking_lot::Mutex;

use crate::content::join_asset_path;
use crate::types::{ChapterIndex, SearchFlags};

/// Cache key: one chapter of one guide, compiled under one flag set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    pub guide_dir: String,
    pub chapter_path: String,
    pub flags: SearchFlags,
}

impl ChapterKey {
    pub fn new(guide_dir: &str, chapter_path: &str, flags: SearchFlags) -> Self {
        Self {
            guide_dir: guide_dir.to_string(),
            chapter_path: chapter_path.to_string(),
            flags,
        }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_asset_path(&self.guide_dir, &self.chapter_path))
    }
}

pub struct ChapterCache {
    entries: Mutex<LruCache<ChapterKey, Arc<ChapterIndex>>>,
}

impl ChapterCache {
    /// Create a cache holding at most `capacity` chapters (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Look up a chapter and mark it most recently used.
    pub fn get(&self, key: &ChapterKey) -> Option<Arc<ChapterIndex>> {
        self.entries.lock().get(key).cloned()
    }

    /// Presence check that leaves recency untouched.
    pub fn contains(&self, key: &ChapterKey) -> bool {
        self.entries.lock().contains(key)
    }

    /// Insert or replace a chapter. Returns the key evicted to make room, if any.
    pub fn put(&self, key: ChapterKey, index: Arc<ChapterIndex>) -> Option<ChapterKey> {
        let evicted = self
            .entries
            .lock()
            .push(key.clone(), index)
            .map(|(old_key, _)| old_key)
            .filter(|old_key| *old_key != key);
        if let Some(ref old_key) = evicted {
            debug!("chapter cache evicted {}", old_key);
        }
        evicted
    }

    /// Remove one chapter. Returns whether it was present.
    pub fn evict(&self, key: &ChapterKey) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Cached keys, most recently used first.
    pub fn keys_by_recency(&self) -> Vec<ChapterKey> {
        self.entries.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Return the cached index for `key`, building and inserting it on a miss.
    ///
    /// `build` runs without the lock held. A failed build leaves the cache
    /// untouched.
    pub fn get_or_build<E>(
        &self,
        key: ChapterKey,
        build: impl FnOnce() -> Result<ChapterIndex, E>,
    ) -> Result<Arc<ChapterIndex>, E> {
        if let Some(index) = self.get(&key) {
            return Ok(index);
        }
        let index = Arc::new(build()?);
        debug!("indexed {} ({} blocks)", key, index.blocks.len());
        self.put(key, Arc::clone(&index));
        Ok(index)
    }
}

impl Default for ChapterCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_CAPACITY)
    }
}
