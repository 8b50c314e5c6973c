//! Starts syncs for a batch of repositories.

use crate::config::FanOutConfig;
use crate::error::AppError;
use crate::models::sync_state::CanonicalSyncState;
use crate::models::sync_status::DispatchResult;
use crate::services::catalog::Catalog;
use crate::services::fan_out;
use crate::services::sync_client::SyncControl;
use std::sync::Arc;

/// Sends one start request per repository and reports each outcome.
#[derive(Clone)]
pub struct SyncDispatcher {
    catalog: Arc<dyn Catalog>,
    client: Arc<dyn SyncControl>,
    fan_out: FanOutConfig,
}

impl SyncDispatcher {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        client: Arc<dyn SyncControl>,
        fan_out: FanOutConfig,
    ) -> Self {
        Self {
            catalog,
            client,
            fan_out,
        }
    }

    /// Start a sync for every repository ID.
    ///
    /// Returns exactly one result per input ID, in input order. A conflict
    /// (sync already running) or any other failure is recorded for that
    /// repository and the rest of the batch carries on. Nothing is retried.
    pub async fn dispatch_sync(&self, repository_ids: &[i64]) -> Vec<DispatchResult> {
        let catalog = Arc::clone(&self.catalog);
        let client = Arc::clone(&self.client);

        let outcomes = fan_out::run_bounded(repository_ids.to_vec(), self.fan_out, move |id| {
            let catalog = Arc::clone(&catalog);
            let client = Arc::clone(&client);
            async move { dispatch_one(catalog.as_ref(), client.as_ref(), id).await }
        })
        .await;

        outcomes
            .into_iter()
            .map(|(id, outcome)| match outcome {
                Ok(result) => {
                    if let DispatchResult::Dispatched { state, .. } = &result {
                        log::info!("[dispatch] Repository {} sync dispatched ({})", id, state);
                    }
                    result
                }
                Err(error) => {
                    let error = error.for_repository(id);
                    if error.is_conflict() {
                        log::warn!("[dispatch] Repository {} already syncing", id);
                    } else {
                        log::error!("[dispatch] Repository {} sync failed: {}", id, error);
                    }
                    DispatchResult::Failed { id, error }
                }
            })
            .collect()
    }
}

async fn dispatch_one(
    catalog: &dyn Catalog,
    client: &dyn SyncControl,
    id: i64,
) -> Result<DispatchResult, AppError> {
    let repo = catalog.repository(id).await?;
    let started = client.start_sync(&repo.remote_id).await?;
    let state = CanonicalSyncState::classify(&started.state)?;

    Ok(DispatchResult::Dispatched {
        id,
        product_id: repo.product_id,
        state,
        sync_id: started.job_id,
    })
}
