//! Cache Entry Module
//!
//! Defines the unit of storage for both cache tiers: the serialized payload
//! plus the metadata eviction strategies decide on.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Entry Priority ==
/// Advisory priority attached to each entry.
///
/// Strategies and the pressure sweep use it to decide who goes first:
/// `Low` entries are the first candidates, `Critical` the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

// == Cache Entry ==
/// Represents a single cache entry with TTL, access tracking, and tags.
///
/// The `value` field holds the payload after serialization (and after any
/// compression/encryption transform); deserialization reverses the same
/// pipeline. Entries round-trip through JSON for the durable tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key the entry is stored under, unique within one cache instance
    pub key: String,
    /// Serialized (and possibly transformed) payload
    pub value: String,
    /// Timestamp of the last write (Unix milliseconds)
    pub created_at: u64,
    /// Number of successful reads since creation
    pub access_count: u64,
    /// Timestamp of the most recent read (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Time-to-live in milliseconds, counted from `created_at`
    pub ttl_ms: u64,
    /// Estimated serialized size in bytes, recomputed on every write
    pub size_bytes: usize,
    /// Advisory eviction priority
    pub priority: Priority,
    /// Labels enabling bulk invalidation
    pub tags: Vec<String>,
    /// Whether a compression transform was applied to `value`
    pub compressed: bool,
    /// Whether an encryption transform was applied to `value`
    pub encrypted: bool,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry from an already-serialized value.
    ///
    /// `size_bytes` is derived from the serialized payload; `created_at`
    /// and `last_accessed_at` are both set to now.
    pub fn new(key: String, value: String, ttl_ms: u64, priority: Priority, tags: Vec<String>) -> Self {
        let now = current_timestamp_ms();
        let size_bytes = value.len();

        Self {
            key,
            value,
            created_at: now,
            access_count: 0,
            last_accessed_at: now,
            ttl_ms,
            size_bytes,
            priority,
            tags,
            compressed: false,
            encrypted: false,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry's TTL has lapsed.
    ///
    /// Boundary condition: an entry is valid iff `now - created_at < ttl_ms`,
    /// so it is expired the instant the full TTL has elapsed. Expired entries
    /// must never be returned from a lookup and are treated as absent by
    /// eviction accounting.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) >= self.ttl_ms
    }

    // == Touch ==
    /// Records a successful read: bumps `access_count` and refreshes
    /// `last_accessed_at`.
    pub fn touch(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }

    // == Idle Time ==
    /// Milliseconds since the entry was last read.
    pub fn idle_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_accessed_at)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds.
    ///
    /// Returns 0 once the entry has expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        let expires_at = self.created_at.saturating_add(self.ttl_ms);
        expires_at.saturating_sub(now)
    }

    /// Checks whether the entry carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ttl_ms: u64) -> CacheEntry {
        CacheEntry::new(
            "k".to_string(),
            "\"v\"".to_string(),
            ttl_ms,
            Priority::Normal,
            vec![],
        )
    }

    #[test]
    fn test_entry_creation() {
        let e = entry(60_000);

        assert_eq!(e.key, "k");
        assert_eq!(e.access_count, 0);
        assert_eq!(e.size_bytes, 3);
        assert_eq!(e.created_at, e.last_accessed_at);
        assert!(!e.compressed);
        assert!(!e.encrypted);
    }

    #[test]
    fn test_entry_not_expired_within_ttl() {
        let e = entry(60_000);
        assert!(!e.is_expired(e.created_at + 59_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        // Expired exactly when the full TTL has elapsed
        let e = entry(100);
        assert!(!e.is_expired(e.created_at + 99));
        assert!(e.is_expired(e.created_at + 100));
        assert!(e.is_expired(e.created_at + 150));
    }

    #[test]
    fn test_touch_updates_access_tracking() {
        let mut e = entry(60_000);
        let later = e.created_at + 500;

        e.touch(later);
        e.touch(later + 100);

        assert_eq!(e.access_count, 2);
        assert_eq!(e.last_accessed_at, later + 100);
    }

    #[test]
    fn test_idle_ms() {
        let mut e = entry(60_000);
        let later = e.created_at + 1_000;
        e.touch(later);

        assert_eq!(e.idle_ms(later + 250), 250);
        // Clock going backwards saturates to zero rather than underflowing
        assert_eq!(e.idle_ms(later.saturating_sub(10)), 0);
    }

    #[test]
    fn test_ttl_remaining() {
        let e = entry(1_000);
        assert_eq!(e.ttl_remaining_ms(e.created_at + 400), 600);
        assert_eq!(e.ttl_remaining_ms(e.created_at + 1_000), 0);
        assert_eq!(e.ttl_remaining_ms(e.created_at + 2_000), 0);
    }

    #[test]
    fn test_has_tag() {
        let mut e = entry(60_000);
        e.tags = vec!["images".to_string(), "user:42".to_string()];

        assert!(e.has_tag("images"));
        assert!(e.has_tag("user:42"));
        assert!(!e.has_tag("user"));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn test_entry_serde_round_trip() {
        let mut e = entry(5_000);
        e.tags = vec!["x".to_string()];
        e.touch(e.created_at + 10);

        let json = serde_json::to_string(&e).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(back.key, e.key);
        assert_eq!(back.value, e.value);
        assert_eq!(back.access_count, 1);
        assert_eq!(back.size_bytes, e.size_bytes);
        assert_eq!(back.priority, Priority::Normal);
    }
}
