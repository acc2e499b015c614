//! LRU cache of view instances.

use std::fmt;

use lru::LruCache;

use crate::scroll::ScrollOffset;
use crate::RouteViewError;

use super::key::CacheKey;

/// Cached render for one key.
pub struct CacheEntry<I, T> {
    /// Instance rendered for this key. Owned by the cache until evicted.
    pub instance: I,

    /// Scrollable element of the instance, resolved after mount.
    pub scroll_target: Option<T>,

    /// Offset captured when the entry was last deactivated.
    pub saved_scroll: Option<ScrollOffset>,

    generation: u64,
}

impl<I, T> CacheEntry<I, T> {
    fn new(instance: I, generation: u64) -> Self {
        Self {
            instance,
            scroll_target: None,
            saved_scroll: None,
            generation,
        }
    }

    /// Insertion generation, unique per cache.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<I: fmt::Debug, T: fmt::Debug> fmt::Debug for CacheEntry<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("instance", &self.instance)
            .field("scroll_target", &self.scroll_target)
            .field("saved_scroll", &self.saved_scroll)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Entry removed from the cache by an insert.
#[derive(Debug)]
pub struct Eviction<I, T> {
    /// Key that was evicted.
    pub key: CacheKey,

    /// The removed entry.
    pub entry: CacheEntry<I, T>,

    /// The entry is still mounted; destroy it once the render settles.
    pub detached: bool,
}

/// Insert rejected because the key is already cached.
#[derive(Debug)]
pub struct DuplicateKey<I> {
    /// Key that was already present.
    pub key: CacheKey,

    /// Instance handed back to the caller.
    pub instance: I,
}

impl<I> From<DuplicateKey<I>> for RouteViewError {
    fn from(dup: DuplicateKey<I>) -> Self {
        RouteViewError::DuplicateKey(dup.key.into())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Capacity bound (0 = unbounded).
    pub capacity: usize,

    /// Probe hits.
    pub hits: u64,

    /// Probe misses.
    pub misses: u64,

    /// Entries evicted by inserts.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculates the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded key → entry mapping with recency-ordered eviction.
pub struct ViewCache<I, T> {
    entries: LruCache<CacheKey, CacheEntry<I, T>>,
    capacity: usize,
    next_generation: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<I, T> ViewCache<I, T> {
    /// Creates a cache holding at most `capacity` entries (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            capacity,
            next_generation: 1,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Looks up `key` and marks it most recently used.
    pub fn probe(&mut self, key: &str) -> Option<&mut CacheEntry<I, T>> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                self.hits += 1;
                Some(entry)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<I, T>> {
        self.entries.peek(key)
    }

    /// Mutable lookup without touching recency.
    pub fn peek_mut(&mut self, key: &str) -> Option<&mut CacheEntry<I, T>> {
        self.entries.peek_mut(key)
    }

    /// Returns the live entry for `key` if it still has `generation`.
    pub fn live_entry(&mut self, key: &str, generation: u64) -> Option<&mut CacheEntry<I, T>> {
        self.entries
            .peek_mut(key)
            .filter(|entry| entry.generation == generation)
    }

    /// Inserts an instance under a key that must be absent.
    ///
    /// When the capacity is exceeded afterwards, the least recently used entry
    /// is removed and returned. `mounted` is the key of the fragment currently
    /// on screen; an evicted entry with that key comes back `detached`.
    pub fn insert(
        &mut self,
        key: CacheKey,
        instance: I,
        mounted: Option<&str>,
    ) -> Result<Option<Eviction<I, T>>, DuplicateKey<I>> {
        if self.entries.contains(key.as_str()) {
            return Err(DuplicateKey { key, instance });
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.entries.push(key, CacheEntry::new(instance, generation));

        if self.capacity == 0 || self.entries.len() <= self.capacity {
            return Ok(None);
        }

        Ok(self.entries.pop_lru().map(|(key, entry)| {
            self.evictions += 1;
            let detached = mounted == Some(key.as_str());
            tracing::info!(key = %key, detached, "Evicting least recently used view");
            Eviction {
                key,
                entry,
                detached,
            }
        }))
    }

    /// Removes every entry, least recently used first.
    pub fn evict_all(&mut self) -> Vec<(CacheKey, CacheEntry<I, T>)> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(pair) = self.entries.pop_lru() {
            drained.push(pair);
        }
        drained
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries.iter().rev().map(|(key, _)| key.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity bound (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

impl<I, T> fmt::Debug for ViewCache<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCache")
            .field("keys", &self.keys())
            .field("capacity", &self.capacity)
            .finish()
    }
}
