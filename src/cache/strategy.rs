//! Eviction Strategy Module
//!
//! Pluggable admission/eviction policies. Strategies are stateless: every
//! decision derives from the entry itself or from a [`CacheStats`] snapshot,
//! which keeps them testable in isolation and swappable on a live cache.

use crate::cache::{CacheEntry, CacheStats, EntryOptions};

// == Policy Constants ==
/// LRU: evict once idle time exceeds this multiple of the reference idle
/// (the idle time of the earliest-created entry).
const LRU_IDLE_FACTOR: f64 = 1.5;

/// LFU: entries read fewer times than this are eviction candidates.
const LFU_MIN_ACCESS_COUNT: u64 = 2;

/// Size-aware: default admission ceiling for a single value.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MiB

/// Size-aware: entries above this are "large" and evictable under pressure.
const LARGE_ENTRY_BYTES: usize = 10 * 1024;

/// Size-aware: memory pressure kicks in above this fraction of the ceiling.
const PRESSURE_RATIO: f64 = 0.8;

// == Eviction Strategy Trait ==
/// Admission and eviction policy for one cache instance.
///
/// All three decision functions are pure with respect to the store: they
/// read immutable snapshots and never mutate anything.
pub trait EvictionStrategy: Send + Sync {
    /// Short identifier used in config and logs.
    fn name(&self) -> &'static str;

    /// Called before inserting a new or overwritten entry. Returning false
    /// skips the volatile store (a configured durable write still happens).
    fn should_admit(&self, key: &str, size_bytes: usize, opts: &EntryOptions) -> bool;

    /// Called per candidate during a vacuum sweep; true marks the entry
    /// for removal.
    fn should_evict(&self, entry: &CacheEntry, stats: &CacheStats, now: u64) -> bool;

    /// Orders eviction candidates: lower scores are evicted first.
    fn priority_score(&self, entry: &CacheEntry) -> f64;
}

// == LRU Strategy ==
/// Recency-based policy with an adaptive, population-relative threshold.
///
/// The cutoff is 1.5x the idle time of the earliest-created entry, so it
/// tightens automatically as old entries keep being touched under pressure
/// rather than relying on a fixed idle TTL.
#[derive(Debug, Default)]
pub struct LruStrategy;

impl EvictionStrategy for LruStrategy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn should_admit(&self, _key: &str, _size_bytes: usize, _opts: &EntryOptions) -> bool {
        true
    }

    fn should_evict(&self, entry: &CacheEntry, stats: &CacheStats, now: u64) -> bool {
        let Some(reference_idle) = stats.oldest_entry_idle_ms else {
            return false;
        };
        entry.idle_ms(now) as f64 > reference_idle as f64 * LRU_IDLE_FACTOR
    }

    fn priority_score(&self, entry: &CacheEntry) -> f64 {
        // Older last access = lower score = evicted first
        entry.last_accessed_at as f64
    }
}

// == LFU Strategy ==
/// Frequency-based policy: entries that were read fewer than two times are
/// considered cold and evictable.
#[derive(Debug, Default)]
pub struct LfuStrategy;

impl EvictionStrategy for LfuStrategy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn should_admit(&self, _key: &str, _size_bytes: usize, _opts: &EntryOptions) -> bool {
        true
    }

    fn should_evict(&self, entry: &CacheEntry, _stats: &CacheStats, _now: u64) -> bool {
        entry.access_count < LFU_MIN_ACCESS_COUNT
    }

    fn priority_score(&self, entry: &CacheEntry) -> f64 {
        entry.access_count as f64
    }
}

// == Size-Aware Strategy ==
/// Size-sensitive policy: refuses oversized values outright and evicts
/// large entries only when aggregate memory is under stress.
#[derive(Debug)]
pub struct SizeAwareStrategy {
    /// Admission ceiling for a single serialized value, in bytes
    max_value_size: usize,
}

impl SizeAwareStrategy {
    /// Creates the strategy with a custom per-value admission ceiling.
    pub fn new(max_value_size: usize) -> Self {
        Self { max_value_size }
    }
}

impl Default for SizeAwareStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VALUE_SIZE)
    }
}

impl EvictionStrategy for SizeAwareStrategy {
    fn name(&self) -> &'static str {
        "size"
    }

    fn should_admit(&self, _key: &str, size_bytes: usize, opts: &EntryOptions) -> bool {
        let max = opts.max_size_bytes.unwrap_or(self.max_value_size);
        size_bytes < max
    }

    fn should_evict(&self, entry: &CacheEntry, stats: &CacheStats, _now: u64) -> bool {
        if entry.size_bytes <= LARGE_ENTRY_BYTES {
            return false;
        }
        // Large entries are left alone until memory is under stress
        stats.memory_usage_bytes as f64 > stats.memory_limit_bytes as f64 * PRESSURE_RATIO
    }

    fn priority_score(&self, entry: &CacheEntry) -> f64 {
        // Largest entries score lowest, so they are evicted first
        -(entry.size_bytes as f64)
    }
}

// == Strategy Lookup ==
/// Builds a strategy from its config name (`lru`, `lfu`, or `size`).
pub fn strategy_from_name(name: &str) -> Option<Box<dyn EvictionStrategy>> {
    match name {
        "lru" => Some(Box::new(LruStrategy)),
        "lfu" => Some(Box::new(LfuStrategy)),
        "size" | "size-aware" => Some(Box::new(SizeAwareStrategy::default())),
        _ => None,
    }
}
