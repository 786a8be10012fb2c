use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use configs::AppConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use service::runtime::{self, Backends};
use service::uploads::UploadStore;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let addr = cfg.server.bind_addr();
    addr.parse().map_err(|e| StartupError::InvalidConfig(format!("bind address {addr}: {e}")))
}

/// Wire the store handles into the router state.
pub fn build_app(cfg: &AppConfig, backends: &Backends, shutdown: CancellationToken) -> Router {
    let state = ServerState {
        settings: backends.settings_service(&cfg.settings),
        auth: backends.auth_service(),
        uploads: UploadStore::new(&cfg.uploads.dir),
        shutdown,
    };
    routes::build_router(state, cfg.uploads.body_limit_bytes)
}

/// Public entry: build the app and serve until `shutdown` is cancelled.
///
/// The store handle is created here and released after the listener has
/// drained, so no request outlives it.
pub async fn run(shutdown: CancellationToken) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_env().context("load configuration")?;
    let addr = bind_addr(&cfg)?;

    let settings_file = match cfg.storage.backend {
        configs::StorageBackend::File => Some(cfg.storage.settings_file.as_str()),
        configs::StorageBackend::Postgres => None,
    };
    runtime::ensure_env(&cfg.uploads.dir, settings_file)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let backends = Backends::connect(&cfg).await?;
    backends.apply_schema().await?;
    let app = build_app(&cfg, &backends, shutdown.clone());

    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("bind {addr}"))?;
    info!(%addr, backend = ?cfg.storage.backend, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("listener drained, releasing store");
    backends.shutdown().await?;
    Ok(())
}
