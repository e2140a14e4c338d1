//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::warn;

use crate::cache::{strategy_from_name, CacheManager, EvictionStrategy, LruStrategy, SizeAwareStrategy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse, TagInvalidateResponse, VacuumResponse, WarmupRequest, WarmupResponse,
};
use crate::storage::FsBackend;

/// Application state shared across all handlers.
///
/// Holds one cache manager instance; cloning shares the same cache.
#[derive(Clone)]
pub struct AppState {
    /// The cache instance served by this process
    pub cache: CacheManager,
}

impl AppState {
    /// Creates a new AppState around an existing cache manager.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Wires up a cache manager from configuration: eviction strategy by
    /// name (falling back to LRU) and a filesystem durable backend.
    pub fn from_config(config: &Config) -> Self {
        let strategy: Box<dyn EvictionStrategy> = match config.eviction_strategy.as_str() {
            // The size-aware strategy takes its admission ceiling from config
            "size" | "size-aware" => Box::new(SizeAwareStrategy::new(config.max_value_size)),
            name => strategy_from_name(name).unwrap_or_else(|| {
                warn!(
                    strategy = %config.eviction_strategy,
                    "unknown eviction strategy, falling back to lru"
                );
                Box::new(LruStrategy)
            }),
        };

        let cache = CacheManager::new(config.cache_settings(), strategy)
            .with_durable(Arc::new(FsBackend::new(&config.data_dir)));
        Self::new(cache)
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair; `stored: false` in the response means the
/// active strategy declined admission.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let stored = state
        .cache
        .set(&req.key, &req.value, req.entry_options())
        .await;

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from either tier; absent or expired keys are 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get::<serde_json::Value>(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Invalidates a key in both tiers.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let removed = state.cache.invalidate(&key).await;
    Json(DeleteResponse::new(key, removed))
}

/// Handler for DELETE /tag/:tag
///
/// Bulk-invalidates every entry carrying the tag.
pub async fn tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<TagInvalidateResponse> {
    let removed = state.cache.invalidate_by_tag(&tag).await;
    Json(TagInvalidateResponse::new(tag, removed))
}

/// Handler for POST /clear
///
/// Empties both tiers and resets statistics.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new())
}

/// Handler for POST /vacuum
///
/// Runs a sweep immediately and reports what it reclaimed.
pub async fn vacuum_handler(State(state): State<AppState>) -> Json<VacuumResponse> {
    let report = state.cache.vacuum().await;
    Json(VacuumResponse::from(report))
}

/// Handler for POST /warmup
///
/// Preloads the supplied entries with high priority; keys already cached
/// are skipped.
pub async fn warmup_handler(
    State(state): State<AppState>,
    Json(req): Json<WarmupRequest>,
) -> Result<Json<WarmupResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let entries = Arc::new(req.entries);
    let keys: Vec<String> = entries.keys().cloned().collect();

    let fetcher = {
        let entries = entries.clone();
        move |key: String| {
            let entries = entries.clone();
            async move {
                entries
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("no value supplied for key '{}'", key))
            }
        }
    };

    let warmed = state.cache.warmup(&keys, fetcher).await;
    Ok(Json(WarmupResponse { warmed }))
}

/// Handler for GET /stats
///
/// Returns a snapshot of the cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
///
/// Returns health status and the active eviction strategy.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.strategy_name().await))
}
