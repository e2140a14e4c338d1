//! Volatile Store Module
//!
//! The fast in-memory tier: a keyed table of cache entries plus the running
//! aggregate memory counter the pressure checks rely on.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats};

// == Volatile Store ==
/// Authoritative in-memory map from key to [`CacheEntry`].
///
/// The aggregate memory counter is maintained incrementally on every
/// `put`/`remove` so it always equals the sum of `size_bytes` over stored
/// entries without rescans on the hot path. The store performs no TTL
/// checks itself; callers decide validity.
#[derive(Debug)]
pub struct VolatileStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Running sum of `size_bytes` over all stored entries
    memory_usage_bytes: usize,
    /// Request/eviction counters, maintained incrementally
    stats: CacheStats,
}

impl VolatileStore {
    // == Constructor ==
    /// Creates an empty store with the given memory ceiling.
    ///
    /// The ceiling is advisory at this layer: the store only accounts for
    /// memory, the cache manager enforces the bound via vacuum.
    pub fn new(memory_limit_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            memory_usage_bytes: 0,
            stats: CacheStats::new(memory_limit_bytes),
        }
    }

    // == Get ==
    /// O(1) lookup. Does not check TTL validity.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Mutable lookup, used to bump access tracking on hits.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(key)
    }

    /// Checks whether a key is present (regardless of validity).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Put ==
    /// Inserts or replaces an entry.
    ///
    /// The memory counter moves by the delta between the old and new
    /// `size_bytes` (the full new size for a fresh key).
    pub fn put(&mut self, entry: CacheEntry) {
        let new_size = entry.size_bytes;
        let old_size = self
            .entries
            .insert(entry.key.clone(), entry)
            .map(|old| old.size_bytes)
            .unwrap_or(0);

        self.memory_usage_bytes = self.memory_usage_bytes - old_size + new_size;
    }

    // == Remove ==
    /// Deletes an entry; returns the bytes freed (0 if the key was absent).
    pub fn remove(&mut self, key: &str) -> usize {
        match self.entries.remove(key) {
            Some(entry) => {
                self.memory_usage_bytes -= entry.size_bytes;
                entry.size_bytes
            }
            None => 0,
        }
    }

    // == Entries Snapshot ==
    /// Point-in-time, non-live copy of all entries.
    ///
    /// Sweeps and reports iterate the snapshot so the map can be mutated
    /// while they run without invalidating the iteration.
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.entries.values().cloned().collect()
    }

    // == Tag Scan ==
    /// Keys of all entries carrying the given tag.
    pub fn keys_with_tag(&self, tag: &str) -> Vec<String> {
        self.entries
            .values()
            .filter(|e| e.has_tag(tag))
            .map(|e| e.key.clone())
            .collect()
    }

    // == Clear ==
    /// Empties the store and resets statistics to the zero state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.memory_usage_bytes = 0;
        self.stats.reset();
    }

    // == Accessors ==
    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current aggregate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.memory_usage_bytes
    }

    /// Configured memory ceiling in bytes.
    pub fn memory_limit(&self) -> usize {
        self.stats.memory_limit_bytes
    }

    // == Stats Recording ==
    /// Counts a successful retrieval.
    pub fn record_hit(&mut self) {
        self.stats.record_hit();
    }

    /// Counts a failed retrieval.
    pub fn record_miss(&mut self) {
        self.stats.record_miss();
    }

    /// Counts an eviction.
    pub fn record_eviction(&mut self) {
        self.stats.record_eviction();
    }

    /// Counts a TTL expiration.
    pub fn record_expiration(&mut self) {
        self.stats.record_expiration();
    }

    // == Stats Snapshot ==
    /// Builds an owned [`CacheStats`] snapshot as of `now`.
    ///
    /// Counters come from the incremental state; entry count, memory usage,
    /// and the age extrema are filled in from the current table.
    pub fn stats(&self, now: u64) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.entry_count = self.entries.len();
        stats.memory_usage_bytes = self.memory_usage_bytes;

        let oldest = self.entries.values().min_by_key(|e| e.created_at);
        stats.oldest_entry_at = oldest.map(|e| e.created_at);
        stats.newest_entry_at = self.entries.values().map(|e| e.created_at).max();
        stats.oldest_entry_idle_ms = oldest.map(|e| e.idle_ms(now));

        stats
    }
}
