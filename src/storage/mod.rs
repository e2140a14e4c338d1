//! Durable Storage Module
//!
//! The slow, persisted tier behind the cache: a simple async key/value
//! interface. Failures here are never fatal to the cache, which degrades to
//! volatile-only operation.
//!
//! # Backends
//! - [`MemoryBackend`]: HashMap-backed, used in tests and as the default
//! - [`FsBackend`]: one JSON file per key under a data directory

mod fs;
mod memory;

pub use fs::FsBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;

use crate::error::Result;

// == Key Namespace ==
/// Fixed prefix applied to every durable key so cache data cannot collide
/// with unrelated persisted data sharing the same backend.
pub const KEY_NAMESPACE: &str = "tiercache:";

/// Prepends the cache namespace to a key.
pub fn namespaced_key(key: &str) -> String {
    format!("{}{}", KEY_NAMESPACE, key)
}

/// Strips the cache namespace from a durable key, if present.
pub fn strip_namespace(key: &str) -> Option<&str> {
    key.strip_prefix(KEY_NAMESPACE)
}

// == Durable Store Trait ==
/// Async key/value persistence consumed by the cache manager.
///
/// All operations may suspend. Any error maps to
/// [`CacheError::StorageUnavailable`](crate::error::CacheError) at the call
/// site and is treated as a miss (reads) or a declined write (writes).
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetches the serialized entry stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a serialized entry; returns true when the write landed.
    async fn set(&self, key: &str, value: &str) -> Result<bool>;

    /// Removes `key`; absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes a batch of keys.
    async fn delete_many(&self, keys: &[String]) -> Result<()>;

    /// Lists all stored keys beginning with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}
