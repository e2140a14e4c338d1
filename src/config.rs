//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::CacheSettings;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ceiling on aggregate volatile memory, in bytes
    pub memory_limit_bytes: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Eviction strategy name (`lru`, `lfu`, or `size`)
    pub eviction_strategy: String,
    /// Admission ceiling for a single serialized value, in bytes
    /// (consumed by the size-aware strategy)
    pub max_value_size: usize,
    /// Whether writes go through to the durable tier by default
    pub persist_to_disk: bool,
    /// Directory for the filesystem durable backend
    pub data_dir: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background vacuum interval in seconds
    pub vacuum_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_LIMIT_BYTES` - Volatile memory ceiling (default: 104857600)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `EVICTION_STRATEGY` - `lru`, `lfu`, or `size` (default: lru)
    /// - `MAX_VALUE_SIZE` - Per-value admission ceiling in bytes (default: 1048576)
    /// - `PERSIST_TO_DISK` - Write-through by default (default: false)
    /// - `DATA_DIR` - Durable backend directory (default: ./data)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `VACUUM_INTERVAL_SECS` - Vacuum frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            memory_limit_bytes: env::var("MEMORY_LIMIT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100 * 1024 * 1024),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300_000),
            eviction_strategy: env::var("EVICTION_STRATEGY").unwrap_or_else(|_| "lru".to_string()),
            max_value_size: env::var("MAX_VALUE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::cache::DEFAULT_MAX_VALUE_SIZE),
            persist_to_disk: env::var("PERSIST_TO_DISK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            vacuum_interval_secs: env::var("VACUUM_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Cache-manager settings derived from this configuration.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            memory_limit_bytes: self.memory_limit_bytes,
            default_ttl_ms: self.default_ttl_ms,
            persist_to_disk: self.persist_to_disk,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_limit_bytes: 100 * 1024 * 1024,
            default_ttl_ms: 300_000,
            eviction_strategy: "lru".to_string(),
            max_value_size: crate::cache::DEFAULT_MAX_VALUE_SIZE,
            persist_to_disk: false,
            data_dir: "./data".to_string(),
            server_port: 3000,
            vacuum_interval_secs: 60,
        }
    }
}
