//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, VacuumReport};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: serde_json::Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Whether the value was admitted into the cache
    pub stored: bool,
    /// The key that was set
    pub key: String,
    /// Outcome message
    pub message: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Key '{}' was not cached", key)
        };
        Self {
            stored,
            key,
            message,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Whether either tier actually held the key
    pub removed: bool,
    /// The key that was invalidated
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>, removed: bool) -> Self {
        Self {
            removed,
            key: key.into(),
        }
    }
}

/// Response body for bulk invalidation (DELETE /tag/:tag)
#[derive(Debug, Clone, Serialize)]
pub struct TagInvalidateResponse {
    /// The tag that was invalidated
    pub tag: String,
    /// Number of entries removed
    pub removed: usize,
}

impl TagInvalidateResponse {
    /// Creates a new TagInvalidateResponse
    pub fn new(tag: impl Into<String>, removed: usize) -> Self {
        Self {
            tag: tag.into(),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Total requests served
    pub total_requests: u64,
    /// Number of cache hits (either tier)
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Hit rate (hits / total requests)
    pub hit_rate: f64,
    /// Miss rate (misses / total requests)
    pub miss_rate: f64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of TTL expirations
    pub expirations: u64,
    /// Aggregate volatile memory usage in bytes
    pub memory_usage_bytes: usize,
    /// Configured memory ceiling in bytes
    pub memory_limit_bytes: usize,
    /// Current number of entries
    pub entry_count: usize,
    /// Oldest entry write timestamp (Unix ms)
    pub oldest_entry_at: Option<u64>,
    /// Newest entry write timestamp (Unix ms)
    pub newest_entry_at: Option<u64>,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            total_requests: stats.total_requests,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            miss_rate: stats.miss_rate(),
            evictions: stats.evictions,
            expirations: stats.expirations,
            memory_usage_bytes: stats.memory_usage_bytes,
            memory_limit_bytes: stats.memory_limit_bytes,
            entry_count: stats.entry_count,
            oldest_entry_at: stats.oldest_entry_at,
            newest_entry_at: stats.newest_entry_at,
        }
    }
}

/// Response body for the vacuum endpoint (POST /vacuum)
#[derive(Debug, Clone, Serialize)]
pub struct VacuumResponse {
    /// Entries removed from the volatile store
    pub removed: usize,
    /// Bytes reclaimed
    pub freed_bytes: usize,
    /// Lapsed entries swept from the durable tier
    pub durable_removed: usize,
}

impl From<VacuumReport> for VacuumResponse {
    fn from(report: VacuumReport) -> Self {
        Self {
            removed: report.removed,
            freed_bytes: report.freed_bytes,
            durable_removed: report.durable_removed,
        }
    }
}

/// Response body for the warmup endpoint (POST /warmup)
#[derive(Debug, Clone, Serialize)]
pub struct WarmupResponse {
    /// Number of keys actually warmed
    pub warmed: usize,
}

/// Response body for the clear endpoint (POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Outcome message
    pub message: String,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Active eviction strategy name
    pub strategy: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(strategy: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            strategy: strategy.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
