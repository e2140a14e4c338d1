//! Tiercache - a two-tier cache service
//!
//! Provides a fast volatile tier with TTL expiration, pluggable eviction
//! strategies, tag-based invalidation, and write-through to a durable tier.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;
pub mod telemetry;

pub use api::AppState;
pub use cache::{CacheManager, CacheSettings, EntryOptions};
pub use config::Config;
pub use tasks::spawn_vacuum_task;
