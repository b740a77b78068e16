//! Fetch Cache diagnostics server
//!
//! Hosts a cache layer and exposes its statistics and invalidation
//! operations over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetch_cache::{api::create_router, AppState, CacheLayer, Config};

/// Main entry point for the diagnostics server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache layer, restoring any persisted snapshot
/// 4. Start the periodic expiry sweeps
/// 5. Serve the diagnostics router until SIGINT/SIGTERM
/// 6. Stop the sweeps
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fetch Cache diagnostics server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: remote_max_size={}, remote_ttl={}ms, query_max_size={}, query_ttl={}ms, sweep_interval={}s, port={}",
        config.remote_max_size,
        config.remote_ttl_ms,
        config.query_max_size,
        config.query_ttl_ms,
        config.sweep_interval,
        config.server_port
    );
    match &config.cache_dir {
        Some(dir) => info!("Remote cache persisted under {}", dir.display()),
        None => warn!("CACHE_DIR not set, remote cache persists for this session only"),
    }

    let mut layer = CacheLayer::from_config(&config);
    layer.start(config.sweep_interval());

    let app = create_router(AppState::from_layer(&layer));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    layer.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
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
}
