//! Risk Cache - memoization engine for listing risk analysis
//!
//! Hosts the intelligent cache as a local HTTP service for the extension's
//! analysis workers.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risk_cache::api::create_router;
use risk_cache::{
    spawn_maintenance_task, spawn_reporting_task, AppState, Config, ResilientExecutor,
};

/// Main entry point for the risk cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, store and performance tracker
/// 4. Start background maintenance and reporting tasks
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM stop the background tasks and exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "risk_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting risk cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, backoff_ms={}, max_retries={}, port={}, maintenance_interval={}s",
        config.max_entries,
        config.backoff_ms,
        config.max_retries,
        config.server_port,
        config.maintenance_interval
    );

    let state = AppState::from_config(&config);
    info!("Cache initialized");

    let maintenance = spawn_maintenance_task(
        state.cache.clone(),
        Duration::from_secs(config.maintenance_interval),
    );
    let reporting = spawn_reporting_task(
        state.cache.tracker().clone(),
        state.cache.store().clone(),
        ResilientExecutor::from_config(&config),
        Duration::from_secs(config.report_interval),
    );
    info!("Background tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    maintenance.stop().await;
    reporting.stop().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
