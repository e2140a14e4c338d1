//! Cache Statistics Module
//!
//! Tracks cache performance metrics: request counters, memory accounting,
//! and entry-age extrema consumed by eviction strategies.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
///
/// Counters (`hits`, `misses`, ...) are maintained incrementally by the
/// volatile store; the age/extrema fields are filled in when a snapshot is
/// taken. Snapshots are owned copies and never authoritative state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Total number of `get` requests served
    pub total_requests: u64,
    /// Number of successful retrievals (memory or disk tier)
    pub hits: u64,
    /// Number of failed retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries evicted by a strategy or pressure sweep
    pub evictions: u64,
    /// Number of entries removed because their TTL lapsed
    pub expirations: u64,
    /// Sum of `size_bytes` over all currently-stored entries
    pub memory_usage_bytes: usize,
    /// Configured ceiling on `memory_usage_bytes`
    pub memory_limit_bytes: usize,
    /// Current number of entries in the volatile store
    pub entry_count: usize,
    /// `created_at` of the earliest-written entry, if any
    pub oldest_entry_at: Option<u64>,
    /// `created_at` of the latest-written entry, if any
    pub newest_entry_at: Option<u64>,
    /// Idle time of the earliest-written entry (time since its last read).
    /// Reference point for the adaptive LRU eviction threshold.
    pub oldest_entry_idle_ms: Option<u64>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates stats with all counters at zero.
    pub fn new(memory_limit_bytes: usize) -> Self {
        Self {
            memory_limit_bytes,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Fraction of requests served from either tier.
    ///
    /// Returns 0.0 when no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64
        }
    }

    // == Miss Rate ==
    /// Fraction of requests that found nothing in either tier.
    pub fn miss_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.misses as f64 / self.total_requests as f64
        }
    }

    // == Record Hit ==
    /// Counts a successful retrieval.
    pub fn record_hit(&mut self) {
        self.total_requests += 1;
        self.hits += 1;
    }

    // == Record Miss ==
    /// Counts a failed retrieval.
    pub fn record_miss(&mut self) {
        self.total_requests += 1;
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Counts an entry removed under memory pressure or by strategy.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiration ==
    /// Counts an entry removed because its TTL lapsed.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Resets all counters to the zero state, keeping the configured limit.
    pub fn reset(&mut self) {
        *self = Self::new(self.memory_limit_bytes);
    }
}
