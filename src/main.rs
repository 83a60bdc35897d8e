//! Caching Proxy - A transparent caching HTTP reverse proxy
//!
//! Serves repeated GET requests from a fixed-TTL cache and forwards
//! everything else straight through to the origin.

mod cache;
mod config;
mod error;
mod proxy;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache::{CacheStore, MemoryStore};
use config::Config;
use proxy::{create_router, AppState};
use tasks::spawn_cleanup_task;

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables (fatal if the
///    origin URL is missing or invalid)
/// 3. Create the cache store, clearing it first if requested
/// 4. Start the background expiry sweep task
/// 5. Build the outbound client and the Axum router
/// 6. Start the HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caching_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Caching Proxy");

    // Load configuration from environment variables
    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: origin={}, port={}, ttl={}s, cleanup_interval={}s",
        config.origin_url, config.server_port, config.cache_ttl, config.cleanup_interval
    );

    // Create the cache store
    let store = Arc::new(MemoryStore::new(config.cache_ttl));
    info!("Cache store initialized");

    // Clear the store on startup if requested; failure is a warning, not fatal
    if config.clear_cache {
        match store.clear().await {
            Ok(()) => info!("Cache cleared"),
            Err(err) => warn!("Cache clear failed: {}", err),
        }
    }

    // Start background expiry sweep task
    let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
    info!("Background expiry sweep task started");

    // Outbound client with a bounded per-request timeout so a hung
    // origin cannot pin handler tasks indefinitely
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.origin_timeout))
        .build()
        .context("failed to build outbound HTTP client")?;

    // Build router around the shared state
    let state = AppState::new(config.origin_url.clone(), client, store.clone());
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Proxy listening on http://{}", addr);
    info!("Forwarding to origin {}", config.origin_url);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    // Release the store before exiting
    if let Err(err) = store.close().await {
        warn!("Cache store close failed: {}", err);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the expiry sweep task and allows graceful
/// shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
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

    // Abort the sweep task
    cleanup_handle.abort();
    warn!("Expiry sweep task aborted");
}
