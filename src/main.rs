//! Geo Cache - cache monitor server
//!
//! Hosts the dashboard's cache domains and serves their stats and
//! administration endpoints.

use std::net::SocketAddr;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geo_cache::api::{create_router, AppState};
use geo_cache::cache::CACHE_NAMES;
use geo_cache::config::Config;

/// Main entry point for the cache monitor server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache registry (each cache starts its own cleanup sweep)
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM, destroying every cache
#[tokio::main]
async fn main() {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geo_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Geo Cache monitor");

    let config = Config::from_env();
    for (name, cache) in CACHE_NAMES
        .iter()
        .zip([&config.global, &config.device_data, &config.gps_data])
    {
        info!(
            "Cache '{}': max_entries={}, default_ttl={}ms, cleanup_interval={}ms, preload_factor={}, compression_threshold={}B",
            name,
            cache.max_entries,
            cache.default_ttl_ms,
            cache.cleanup_interval_ms,
            cache.preload_factor,
            cache.compression_threshold_bytes
        );
    }

    let state = AppState::from_config(&config);
    info!("Cache registry initialized");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, destroys every cache, which stops the cleanup sweeps.
async fn shutdown_signal(state: AppState) {
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

    state.caches.destroy_all();
    info!("All caches destroyed");
}
