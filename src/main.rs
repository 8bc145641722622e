//! Cache Lab server binary
//!
//! Serves the cache and the load generator over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_lab::api::create_router;
use cache_lab::traffic::{RunController, RunStatus};
use cache_lab::{AppState, Config};

/// Main entry point for the Cache Lab server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache, its upstream and the load generator
/// 4. Start HTTP server on configured port
/// 5. On SIGINT/SIGTERM stop any active run and shut down gracefully
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_lab=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cache Lab server");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: max_size={}, policy={}, ttl={}s, port={}, workers={}, key_space={} ({})",
        config.max_size,
        config.policy,
        config.ttl,
        config.server_port,
        config.workers,
        config.key_space,
        config.key_popularity
    );

    let state = AppState::from_config(&config).context("failed to build application state")?;
    let traffic = state.traffic.clone();

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(traffic))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, stops any active load run so no new requests are
/// dispatched.
async fn shutdown_signal(traffic: RunController) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    if traffic.stop() == RunStatus::Stopping {
        warn!("Active load run stopped");
    }
}
