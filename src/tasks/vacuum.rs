//! Periodic Vacuum Task
//!
//! Background task that runs the cache manager's vacuum sweep on a fixed
//! interval, removing expired entries, applying the active eviction
//! strategy, and sweeping the durable tier.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that periodically vacuums the cache.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Vacuum also runs synchronously inside `set` when memory
/// pressure demands it; this task covers idle periods.
///
/// # Arguments
/// * `cache` - Cache manager handle (cheap clone of the shared instance)
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_vacuum_task(cache: CacheManager, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "starting periodic vacuum task");

        loop {
            tokio::time::sleep(interval).await;

            let report = cache.vacuum().await;
            if report.removed > 0 || report.durable_removed > 0 {
                info!(
                    removed = report.removed,
                    freed_bytes = report.freed_bytes,
                    durable_removed = report.durable_removed,
                    "periodic vacuum reclaimed entries"
                );
            } else {
                debug!("periodic vacuum found nothing to remove");
            }
        }
    })
}
