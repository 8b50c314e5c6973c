//! Content sync - sync job status aggregation for product repositories.
//!
//! Starts repository syncs on a remote sync service, reports normalized job
//! progress, and lays repositories out as a product → release stream →
//! architecture tree. Exposed over a small JSON HTTP API.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use config::AppConfig;
use error::AppError;
use services::catalog::SqliteCatalog;
use services::sync_client::SyncControlClient;
use services::sync_manager::SyncManager;
use std::sync::Arc;

/// Build the sync manager from configuration.
pub async fn build_manager(config: &AppConfig) -> Result<SyncManager, AppError> {
    let labels = config.labels()?;
    let pool = db::initialize(&config.database_path).await?;
    let catalog = SqliteCatalog::new(pool);
    let client = SyncControlClient::new(config.remote.clone())?;

    Ok(SyncManager::new(
        Arc::new(catalog),
        Arc::new(client),
        labels,
        config.fan_out,
    ))
}

/// Run the server until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    log::info!(
        "[app] Using catalog {} and remote {}",
        config.database_path.display(),
        config.remote.base_url
    );

    let manager = build_manager(&config).await?;
    let handle = services::server::start_server(&config.server, manager).await?;

    tokio::signal::ctrl_c().await?;
    log::info!("[app] Shutdown requested");

    handle.shutdown().await;
    Ok(())
}
