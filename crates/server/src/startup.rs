use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;
use service::{runtime, storage::backend::FsByteStore};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = format!("{}:{}", cfg.server.host, cfg.server.port);
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad listen address {raw}: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Open the file-backed stores under the configured data directory.
pub async fn open_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    runtime::ensure_env(&cfg.storage.data_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    let backend = Arc::new(FsByteStore::new(&cfg.storage.data_dir));
    Ok(ServerState::open(backend, &cfg.storage, cfg.realtime.channel_capacity).await)
}

/// Open the stores and serve until Ctrl+C. Pending writes are flushed before returning.
pub async fn run_with(cfg: AppConfig) -> anyhow::Result<()> {
    let state = open_state(&cfg).await?;

    let app: Router = routes::build_router(state.clone(), build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, data_dir = %cfg.storage.data_dir, "starting storefront server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.flush().await;
    info!("pending writes flushed");
    Ok(())
}
