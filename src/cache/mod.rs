//! Cache Module
//!
//! The multi-layer cache subsystem: a fast volatile tier, promotion from a
//! durable tier, pluggable eviction strategies, and tag-based invalidation.

pub mod entry;
mod manager;
mod stats;
mod store;
mod strategy;
mod transform;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, Priority};
pub use manager::{CacheManager, CacheSettings, EntryOptions, VacuumReport};
pub use stats::CacheStats;
pub use store::VolatileStore;
pub use strategy::{
    strategy_from_name, EvictionStrategy, LfuStrategy, LruStrategy, SizeAwareStrategy,
    DEFAULT_MAX_VALUE_SIZE,
};
pub use transform::{NoopTransform, ValueTransform};
