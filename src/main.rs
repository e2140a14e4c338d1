//! Tiercache - a two-tier cache service
//!
//! Serves a single cache instance over HTTP with TTL expiration, pluggable
//! eviction strategies, and durable write-through.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod storage;
mod tasks;
mod telemetry;

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::spawn_vacuum_task;

/// Main entry point for the tiercache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Wire up the cache manager (strategy + durable backend)
/// 4. Start the background vacuum task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiercache service");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: memory_limit={}B, default_ttl={}ms, strategy={}, port={}, vacuum_interval={}s",
        config.memory_limit_bytes,
        config.default_ttl_ms,
        config.eviction_strategy,
        config.server_port,
        config.vacuum_interval_secs
    );

    // Wire up the cache manager and durable backend
    let state = AppState::from_config(&config);
    info!("Cache manager initialized");

    // Start background vacuum task
    let vacuum_handle = spawn_vacuum_task(state.cache.clone(), config.vacuum_interval_secs);
    info!("Background vacuum task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(vacuum_handle))
        .await
        .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the vacuum task and allows graceful shutdown.
async fn shutdown_signal(vacuum_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the vacuum task
    vacuum_handle.abort();
    warn!("Vacuum task aborted");
}
