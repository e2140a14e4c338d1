//! Cache Manager Module
//!
//! Orchestrates the two tiers: serves reads volatile-first with promotion
//! from the durable tier, gates writes through the active eviction strategy,
//! enforces the memory ceiling with vacuum sweeps, and owns warmup,
//! prefetch, and bulk invalidation.
//!
//! All public operations return results as booleans/options/counts; failures
//! in the durable tier or the transform pipeline are logged and degrade the
//! cache rather than reaching callers as errors.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{
    CacheEntry, CacheStats, EvictionStrategy, NoopTransform, Priority, ValueTransform,
    VolatileStore,
};
use crate::storage::{namespaced_key, DurableStore, KEY_NAMESPACE};
use crate::telemetry::{MetricCategory, MetricsRecorder, TracingRecorder};

/// TTL applied to speculative prefetch entries.
const PREFETCH_TTL_MS: u64 = 30_000;

// == Cache Settings ==
/// Instance-level defaults for one cache manager.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Ceiling on aggregate volatile memory, in bytes
    pub memory_limit_bytes: usize,
    /// TTL for entries that do not specify one, in milliseconds
    pub default_ttl_ms: u64,
    /// Whether writes go through to the durable tier by default
    pub persist_to_disk: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            memory_limit_bytes: 100 * 1024 * 1024, // 100 MiB
            default_ttl_ms: 300_000,
            persist_to_disk: false,
        }
    }
}

// == Entry Options ==
/// Per-call overrides for a `set`, merged over the instance defaults.
#[derive(Debug, Clone, Default)]
pub struct EntryOptions {
    /// TTL override in milliseconds
    pub ttl_ms: Option<u64>,
    /// Admission size ceiling override (consumed by size-aware strategies)
    pub max_size_bytes: Option<usize>,
    /// Eviction priority for the entry
    pub priority: Option<Priority>,
    /// Run the instance's compression transform on the payload
    pub compress: bool,
    /// Run the instance's encryption transform on the payload
    pub encrypt: bool,
    /// Write-through to the durable tier override
    pub persist: Option<bool>,
    /// Tags attached for bulk invalidation
    pub tags: Vec<String>,
}

// == Vacuum Report ==
/// Outcome of one vacuum sweep.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct VacuumReport {
    /// Entries removed from the volatile store
    pub removed: usize,
    /// Bytes reclaimed from the volatile store
    pub freed_bytes: usize,
    /// Lapsed entries swept out of the durable tier
    pub durable_removed: usize,
}

// == Cache Manager ==
/// Orchestrator for one named cache instance.
///
/// Cloning produces another handle to the same instance. Applications
/// construct and own the instances they need (an image cache and a
/// user-data cache can run different strategies side by side); there is no
/// global registry.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<RwLock<VolatileStore>>,
    strategy: Arc<RwLock<Box<dyn EvictionStrategy>>>,
    durable: Option<Arc<dyn DurableStore>>,
    transform: Arc<dyn ValueTransform>,
    metrics: Arc<dyn MetricsRecorder>,
    settings: CacheSettings,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a volatile-only manager with a no-op transform and the
    /// tracing metrics recorder.
    pub fn new(settings: CacheSettings, strategy: Box<dyn EvictionStrategy>) -> Self {
        Self {
            store: Arc::new(RwLock::new(VolatileStore::new(settings.memory_limit_bytes))),
            strategy: Arc::new(RwLock::new(strategy)),
            durable: None,
            transform: Arc::new(NoopTransform),
            metrics: Arc::new(TracingRecorder),
            settings,
        }
    }

    /// Attaches a durable tier.
    pub fn with_durable(mut self, durable: Arc<dyn DurableStore>) -> Self {
        self.durable = Some(durable);
        self
    }

    /// Replaces the value transform pipeline.
    pub fn with_transform(mut self, transform: Arc<dyn ValueTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Replaces the metrics recorder.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    // == Get ==
    /// Retrieves and deserializes the value stored under `key`.
    ///
    /// Checks the volatile store first (dropping the entry if its TTL has
    /// lapsed), then falls back to the durable tier and promotes a hit into
    /// the volatile store with a fresh access timestamp. Every branch emits
    /// a timing metric tagged `memory`, `disk`, or `miss`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let started = Instant::now();
        let now = current_timestamp_ms();

        // Volatile tier
        let volatile = {
            let mut store = self.store.write().await;
            let expired = store.get(key).map(|e| e.is_expired(now));
            if expired == Some(true) {
                store.remove(key);
                store.record_expiration();
                None
            } else if let Some(entry) = store.get_mut(key) {
                entry.touch(now);
                let payload = (entry.value.clone(), entry.compressed, entry.encrypted);
                store.record_hit();
                Some(payload)
            } else {
                None
            }
        };

        if let Some((value, compressed, encrypted)) = volatile {
            self.record_timing("cache.get", started, MetricCategory::Memory);
            return self.decode_value(key, &value, compressed, encrypted);
        }

        // Durable tier, promoting on hit
        if let Some(entry) = self.durable_lookup(key, now).await {
            let payload = (entry.value.clone(), entry.compressed, entry.encrypted);
            {
                let mut store = self.store.write().await;
                store.put(entry);
                store.record_hit();
            }
            self.record_timing("cache.get", started, MetricCategory::Disk);
            let (value, compressed, encrypted) = payload;
            return self.decode_value(key, &value, compressed, encrypted);
        }

        self.store.write().await.record_miss();
        self.record_timing("cache.get", started, MetricCategory::Miss);
        None
    }

    /// Fetches and validates a durable entry, returning it ready for
    /// promotion (fresh `last_accessed_at`). Lapsed durable entries are
    /// deleted lazily; adapter failures degrade to a miss.
    async fn durable_lookup(&self, key: &str, now: u64) -> Option<CacheEntry> {
        let durable = self.durable.as_ref()?;
        let nkey = namespaced_key(key);

        let serialized = match durable.get(&nkey).await {
            Ok(Some(serialized)) => serialized,
            Ok(None) => return None,
            Err(err) => {
                warn!(component = "cache", key, error = %err, "durable get failed");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&serialized) {
            Ok(mut entry) if !entry.is_expired(now) => {
                entry.last_accessed_at = now;
                Some(entry)
            }
            Ok(_) => {
                if let Err(err) = durable.delete(&nkey).await {
                    warn!(component = "cache", key, error = %err, "durable delete failed");
                }
                None
            }
            Err(err) => {
                warn!(component = "cache", key, error = %err, "corrupt durable entry");
                None
            }
        }
    }

    // == Set ==
    /// Serializes and stores a value; returns true when it was cached.
    ///
    /// The active strategy's admission decision gates the volatile insert;
    /// a rejected value still goes to the durable tier when persistence is
    /// configured, but `set` reports false. When the durable write-through
    /// fails, the volatile insert is rolled back so no partially-committed
    /// state remains.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        opts: EntryOptions,
    ) -> bool {
        let started = Instant::now();

        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(component = "cache", key, error = %err, "serialization failed");
                return false;
            }
        };

        let (payload, compressed, encrypted) = if opts.compress || opts.encrypt {
            match self.transform.encode(&serialized) {
                Ok(encoded) => (
                    encoded,
                    opts.compress && self.transform.compresses(),
                    opts.encrypt && self.transform.encrypts(),
                ),
                Err(err) => {
                    warn!(component = "cache", key, error = %err, "transform encode failed");
                    return false;
                }
            }
        } else {
            (serialized, false, false)
        };

        let admitted = {
            let strategy = self.strategy.read().await;
            strategy.should_admit(key, payload.len(), &opts)
        };

        let mut entry = CacheEntry::new(
            key.to_string(),
            payload,
            opts.ttl_ms.unwrap_or(self.settings.default_ttl_ms),
            opts.priority.unwrap_or_default(),
            opts.tags,
        );
        entry.compressed = compressed;
        entry.encrypted = encrypted;

        let persist = opts.persist.unwrap_or(self.settings.persist_to_disk);

        if admitted {
            self.store.write().await.put(entry.clone());
        } else {
            debug!(component = "cache", key, "admission declined by strategy");
        }

        if persist && !self.write_through(&entry).await {
            if admitted {
                // No partially-committed state: undo the volatile insert
                self.store.write().await.remove(key);
            }
            return false;
        }

        self.record_timing("cache.set", started, MetricCategory::Set);

        if admitted {
            self.check_pressure().await;
        }
        admitted
    }

    /// Persists one entry to the durable tier; returns false on any failure.
    async fn write_through(&self, entry: &CacheEntry) -> bool {
        let Some(durable) = &self.durable else {
            return false;
        };
        let serialized = match serde_json::to_string(entry) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(component = "cache", key = %entry.key, error = %err, "entry serialization failed");
                return false;
            }
        };
        match durable.set(&namespaced_key(&entry.key), &serialized).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(component = "cache", key = %entry.key, "durable set declined");
                false
            }
            Err(err) => {
                warn!(component = "cache", key = %entry.key, error = %err, "durable set failed");
                false
            }
        }
    }

    // == Invalidate ==
    /// Removes `key` from both tiers; returns true if either tier had it.
    pub async fn invalidate(&self, key: &str) -> bool {
        let mut removed = self.store.write().await.remove(key) > 0;

        if let Some(durable) = &self.durable {
            let nkey = namespaced_key(key);
            if !removed {
                removed = matches!(durable.get(&nkey).await, Ok(Some(_)));
            }
            if let Err(err) = durable.delete(&nkey).await {
                warn!(component = "cache", key, error = %err, "durable delete failed");
            }
        }
        removed
    }

    // == Invalidate By Tag ==
    /// Removes every entry carrying `tag`; returns the count removed.
    ///
    /// Operates on a snapshot of the volatile store; the durable tier is
    /// only touched for those same keys.
    pub async fn invalidate_by_tag(&self, tag: &str) -> usize {
        let keys = self.store.read().await.keys_with_tag(tag);
        if keys.is_empty() {
            return 0;
        }

        let mut count = 0;
        {
            let mut store = self.store.write().await;
            for key in &keys {
                if store.remove(key) > 0 {
                    count += 1;
                }
            }
        }

        if let Some(durable) = &self.durable {
            let nkeys: Vec<String> = keys.iter().map(|k| namespaced_key(k)).collect();
            if let Err(err) = durable.delete_many(&nkeys).await {
                warn!(component = "cache", tag, error = %err, "durable bulk delete failed");
            }
        }

        info!(component = "cache", tag, count, "tag invalidation");
        count
    }

    // == Clear ==
    /// Empties both tiers and resets statistics to the zero state.
    pub async fn clear(&self) {
        self.store.write().await.clear();

        if let Some(durable) = &self.durable {
            match durable.list_keys(KEY_NAMESPACE).await {
                Ok(keys) => {
                    if let Err(err) = durable.delete_many(&keys).await {
                        warn!(component = "cache", error = %err, "durable clear failed");
                    }
                }
                Err(err) => {
                    warn!(component = "cache", error = %err, "durable key listing failed");
                }
            }
        }
    }

    // == Warmup ==
    /// Pre-populates the cache ahead of expected demand.
    ///
    /// Fetches each key not already cached and stores it with
    /// `Priority::High`. Per-key fetcher failures are logged and skipped;
    /// they never abort the batch. Returns the number of keys warmed.
    pub async fn warmup<T, F, Fut>(&self, keys: &[String], fetcher: F) -> usize
    where
        T: Serialize,
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        let mut warmed = 0;
        for key in keys {
            if self.is_cached(key).await {
                continue;
            }
            match fetcher(key.clone()).await {
                Ok(value) => {
                    let opts = EntryOptions {
                        priority: Some(Priority::High),
                        ..EntryOptions::default()
                    };
                    if self.set(key, &value, opts).await {
                        warmed += 1;
                    }
                }
                Err(err) => {
                    warn!(component = "cache", key, error = %err, "warmup fetch failed");
                }
            }
        }
        info!(component = "cache", warmed, requested = keys.len(), "warmup complete");
        warmed
    }

    // == Prefetch ==
    /// Speculatively loads keys in parallel.
    ///
    /// Stored entries get `Priority::Low` and a short TTL so speculative
    /// data cannot crowd out higher-priority entries. Returns the number of
    /// keys fetched and stored.
    pub async fn prefetch<T, F, Fut>(&self, keys: &[String], fetcher: F) -> usize
    where
        T: Serialize,
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        let fetcher = &fetcher;
        let tasks = keys.iter().cloned().map(|key| async move {
            if self.is_cached(&key).await {
                return false;
            }
            match fetcher(key.clone()).await {
                Ok(value) => {
                    let opts = EntryOptions {
                        priority: Some(Priority::Low),
                        ttl_ms: Some(PREFETCH_TTL_MS),
                        ..EntryOptions::default()
                    };
                    self.set(&key, &value, opts).await
                }
                Err(err) => {
                    warn!(component = "cache", key, error = %err, "prefetch fetch failed");
                    false
                }
            }
        });

        join_all(tasks).await.into_iter().filter(|stored| *stored).count()
    }

    /// True when the volatile store holds a still-valid entry for `key`.
    async fn is_cached(&self, key: &str) -> bool {
        let now = current_timestamp_ms();
        self.store
            .read()
            .await
            .get(key)
            .map(|e| !e.is_expired(now))
            .unwrap_or(false)
    }

    // == Vacuum ==
    /// Sweeps both tiers: drops expired entries, applies the active
    /// strategy's eviction marks (lowest `priority_score` first), and, while
    /// aggregate memory still exceeds the ceiling, evicts survivors ordered
    /// by entry priority then score until the bound holds again.
    pub async fn vacuum(&self) -> VacuumReport {
        let now = current_timestamp_ms();
        let (snapshot, stats) = {
            let store = self.store.read().await;
            (store.entries(), store.stats(now))
        };

        let strategy = self.strategy.read().await;

        let mut expired: Vec<String> = Vec::new();
        let mut marked: Vec<&CacheEntry> = Vec::new();
        for entry in &snapshot {
            if entry.is_expired(now) {
                expired.push(entry.key.clone());
            } else if strategy.should_evict(entry, &stats, now) {
                marked.push(entry);
            }
        }
        marked.sort_by(|a, b| {
            strategy
                .priority_score(a)
                .total_cmp(&strategy.priority_score(b))
        });

        let mut report = VacuumReport::default();
        {
            let mut store = self.store.write().await;

            for key in &expired {
                let freed = store.remove(key);
                if freed > 0 {
                    report.removed += 1;
                    report.freed_bytes += freed;
                    store.record_expiration();
                }
            }

            for entry in &marked {
                let freed = store.remove(&entry.key);
                if freed > 0 {
                    report.removed += 1;
                    report.freed_bytes += freed;
                    store.record_eviction();
                }
            }

            // Strategy marks alone cannot guarantee the ceiling; keep
            // evicting lowest-priority, lowest-score survivors until the
            // memory bound holds again.
            if store.memory_usage() > store.memory_limit() {
                let mut survivors = store.entries();
                survivors.sort_by(|a, b| {
                    a.priority.cmp(&b.priority).then(
                        strategy
                            .priority_score(a)
                            .total_cmp(&strategy.priority_score(b)),
                    )
                });
                for entry in &survivors {
                    if store.memory_usage() <= store.memory_limit() {
                        break;
                    }
                    let freed = store.remove(&entry.key);
                    if freed > 0 {
                        report.removed += 1;
                        report.freed_bytes += freed;
                        store.record_eviction();
                    }
                }
            }
        }
        drop(strategy);

        report.durable_removed = self.sweep_durable(now).await;

        if report.removed > 0 || report.durable_removed > 0 {
            info!(
                component = "cache",
                removed = report.removed,
                freed_bytes = report.freed_bytes,
                durable_removed = report.durable_removed,
                "vacuum complete"
            );
        } else {
            debug!(component = "cache", "vacuum found nothing to remove");
        }
        report
    }

    /// Deletes durable entries whose TTL has lapsed; returns the count.
    async fn sweep_durable(&self, now: u64) -> usize {
        let Some(durable) = &self.durable else {
            return 0;
        };

        let keys = match durable.list_keys(KEY_NAMESPACE).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(component = "cache", error = %err, "durable key listing failed");
                return 0;
            }
        };

        let mut lapsed = Vec::new();
        for key in keys {
            match durable.get(&key).await {
                Ok(Some(serialized)) => match serde_json::from_str::<CacheEntry>(&serialized) {
                    Ok(entry) => {
                        if entry.is_expired(now) {
                            lapsed.push(key);
                        }
                    }
                    Err(_) => lapsed.push(key),
                },
                Ok(None) => {}
                Err(err) => {
                    warn!(component = "cache", key, error = %err, "durable get failed");
                }
            }
        }

        if lapsed.is_empty() {
            return 0;
        }
        match durable.delete_many(&lapsed).await {
            Ok(()) => lapsed.len(),
            Err(err) => {
                warn!(component = "cache", error = %err, "durable sweep delete failed");
                0
            }
        }
    }

    // == Memory Pressure ==
    /// Runs a vacuum when aggregate volatile memory exceeds the ceiling,
    /// keeping the bound true at every observable point between calls.
    async fn check_pressure(&self) {
        let over = {
            let store = self.store.read().await;
            store.memory_usage() > store.memory_limit()
        };
        if over {
            let report = self.vacuum().await;
            debug!(
                component = "cache",
                removed = report.removed,
                freed_bytes = report.freed_bytes,
                "pressure vacuum"
            );
        }
    }

    // == Stats ==
    /// Owned snapshot of the current statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats(current_timestamp_ms())
    }

    // == Strategy Swap ==
    /// Swaps the active eviction strategy. Strategies are stateless, so a
    /// mid-life swap is always safe.
    pub async fn set_strategy(&self, strategy: Box<dyn EvictionStrategy>) {
        let name = strategy.name();
        *self.strategy.write().await = strategy;
        info!(component = "cache", strategy = name, "eviction strategy swapped");
    }

    /// Name of the active strategy.
    pub async fn strategy_name(&self) -> &'static str {
        self.strategy.read().await.name()
    }

    // == Internals ==
    fn decode_value<T: DeserializeOwned>(
        &self,
        key: &str,
        value: &str,
        compressed: bool,
        encrypted: bool,
    ) -> Option<T> {
        let raw = if compressed || encrypted {
            match self.transform.decode(value) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(component = "cache", key, error = %err, "transform decode failed");
                    return None;
                }
            }
        } else {
            value.to_string()
        };

        match serde_json::from_str(&raw) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(component = "cache", key, error = %err, "deserialization failed");
                None
            }
        }
    }

    fn record_timing(&self, name: &str, started: Instant, category: MetricCategory) {
        self.metrics
            .record_metric(name, started.elapsed().as_millis() as u64, category);
    }
}
