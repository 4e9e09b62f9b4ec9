//! Loc8r API server binary.

use anyhow::Context;
use api_server::{config::Config, create_app, create_state, init_tracing};
use location_store::{LocationStore, MemoryLocationStore, SqliteLocationStore};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    info!(environment = ?config.environment, "Starting Loc8r API server");

    if config.uses_memory_store() {
        warn!("Using the in-memory store, data will not survive a restart");
        serve(config, MemoryLocationStore::new()).await
    } else {
        let store = SqliteLocationStore::connect(&config.database_url)
            .await
            .with_context(|| format!("failed to open database {}", config.database_url))?;
        serve(config, store).await
    }
}

async fn serve<S: LocationStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let addr = config.server_addr();
    let state = create_state(config, store)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
