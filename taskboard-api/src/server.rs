//! HTTP server wiring

use crate::api::build_router;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use taskboard_core::config::Config;
use taskboard_core::core_board::{BoardManagerImpl, BoardSqlStore, InMemoryDirectory};
use tokio::net::TcpListener;
use tracing::info;

/// Build application state from configuration, opening the database
pub fn build_state(config: &Config) -> Result<Arc<AppState>> {
    if let Some(parent) = config.store.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let store = BoardSqlStore::open(&config.store).context("opening board store")?;
    let directory = Arc::new(InMemoryDirectory::new());
    let manager = BoardManagerImpl::from_config(&config.invites, Arc::new(store), directory.clone())?;

    Ok(Arc::new(AppState::new(manager, directory, config.server.request_timeout)))
}

/// Serve until ctrl-c
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config)?;
    let router = build_router(state);

    let listener = TcpListener::bind(config.server.bind_address).await?;
    info!(address = %config.server.bind_address, "task board API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("task board API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
