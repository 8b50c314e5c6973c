//! Entry point for sync operations.
//!
//! `SyncManager` wires the catalog and the remote sync-control client into
//! the dispatcher, the status reporter and the hierarchy builder, and adds
//! the product and organization level operations built on top of them.

use crate::config::FanOutConfig;
use crate::error::AppError;
use crate::models::catalog::{Organization, Product};
use crate::models::dashboard::{DashboardView, ProductSummary};
use crate::models::hierarchy::HierarchyNode;
use crate::models::sync_state::StateLabels;
use crate::models::sync_status::{DispatchResult, SyncJobStatus};
use crate::services::catalog::Catalog;
use crate::services::format;
use crate::services::hierarchy_builder;
use crate::services::status_reporter::StatusReporter;
use crate::services::sync_client::SyncControl;
use crate::services::sync_dispatcher::SyncDispatcher;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct SyncManager {
    catalog: Arc<dyn Catalog>,
    client: Arc<dyn SyncControl>,
    dispatcher: SyncDispatcher,
    reporter: StatusReporter,
}

impl SyncManager {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        client: Arc<dyn SyncControl>,
        labels: StateLabels,
        fan_out: FanOutConfig,
    ) -> Self {
        let dispatcher = SyncDispatcher::new(Arc::clone(&catalog), Arc::clone(&client), fan_out);
        let reporter = StatusReporter::new(
            Arc::clone(&catalog),
            Arc::clone(&client),
            Arc::new(labels),
            fan_out,
        );

        Self {
            catalog,
            client,
            dispatcher,
            reporter,
        }
    }

    /// Start a sync for every repository; one result per ID, in order.
    pub async fn dispatch_sync(&self, repository_ids: &[i64]) -> Vec<DispatchResult> {
        self.dispatcher.dispatch_sync(repository_ids).await
    }

    /// Current status of each repository. Failed lookups are skipped.
    pub async fn report_status(&self, repository_ids: &[i64]) -> Vec<SyncJobStatus> {
        self.reporter.report_status(repository_ids).await
    }

    /// Like [`report_status`](Self::report_status) with a fixed reference instant.
    pub async fn report_status_at(
        &self,
        repository_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Vec<SyncJobStatus> {
        self.reporter.report_status_at(repository_ids, now).await
    }

    /// Group the products' locker repositories into a display tree.
    pub fn build_hierarchy(
        &self,
        products: &[Product],
        organization: &Organization,
    ) -> Vec<HierarchyNode> {
        hierarchy_builder::build(products, organization)
    }

    /// Tree of the organization's syncable products.
    pub async fn organization_hierarchy(
        &self,
        organization_id: i64,
    ) -> Result<Vec<HierarchyNode>, AppError> {
        let (organization, products) = self.syncable_products(organization_id).await?;
        Ok(hierarchy_builder::build(&products, &organization))
    }

    /// Ask the remote to cancel the repository's running sync.
    ///
    /// Does not wait for the job to actually stop.
    pub async fn cancel_sync(&self, repository_id: i64) -> Result<(), AppError> {
        let repo = self.catalog.repository(repository_id).await?;
        self.client.cancel_sync(&repo.remote_id).await?;
        log::info!(
            "[cancel] Cancel requested for repository {} ({})",
            repository_id,
            repo.remote_id
        );
        Ok(())
    }

    /// Start a sync for every locker repository of a product.
    pub async fn sync_product(&self, product_id: i64) -> Result<Vec<DispatchResult>, AppError> {
        let product = self.catalog.product(product_id).await?;
        let organization = self.catalog.organization(product.organization_id).await?;

        let ids: Vec<i64> = product
            .locker_repositories(&organization)
            .map(|repo| repo.id)
            .collect();
        log::info!(
            "[dispatch] Syncing product {} ({} repositories)",
            product.name,
            ids.len()
        );

        Ok(self.dispatcher.dispatch_sync(&ids).await)
    }

    /// Dashboard for an organization as of now.
    pub async fn dashboard(&self, organization_id: i64) -> Result<DashboardView, AppError> {
        self.dashboard_at(organization_id, Utc::now()).await
    }

    pub async fn dashboard_at(
        &self,
        organization_id: i64,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, AppError> {
        let (organization, products) = self.syncable_products(organization_id).await?;
        let tree = hierarchy_builder::build(&products, &organization);

        let repositories = tree
            .iter()
            .flat_map(|node| node.all_repos())
            .cloned()
            .collect();
        let statuses = self.reporter.report_repositories_at(repositories, now).await;

        let summaries = products
            .iter()
            .map(|product| {
                let total_size_bytes: i64 = statuses
                    .iter()
                    .filter(|s| s.product_id == product.id)
                    .fold(0i64, |total, s| total.saturating_add(s.progress.total_size_bytes));
                ProductSummary {
                    id: product.id,
                    name: product.name.clone(),
                    total_size_bytes,
                    size: format::human_size(total_size_bytes),
                }
            })
            .collect();

        Ok(DashboardView {
            products: tree,
            statuses,
            summaries,
        })
    }

    async fn syncable_products(
        &self,
        organization_id: i64,
    ) -> Result<(Organization, Vec<Product>), AppError> {
        let organization = self.catalog.organization(organization_id).await?;
        let products = self
            .catalog
            .organization_products(organization_id)
            .await?
            .into_iter()
            .filter(|product| organization.syncable(product))
            .collect();
        Ok((organization, products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sync_state::CanonicalSyncState;
    use crate::services::testing::{product, repo, status, FakeCatalog, FakeSyncControl};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn catalog() -> FakeCatalog {
        let mut unsyncable = product(3, "Custom", vec![repo(31, 3, None, "noarch")]);
        unsyncable.syncable = false;
        let mut promoted = repo(13, 1, Some("6"), "x86_64");
        promoted.environment_id = 99;

        FakeCatalog::with_products(vec![
            product(
                1,
                "RHEL",
                vec![
                    repo(11, 1, Some("6"), "x86_64"),
                    repo(12, 1, None, "noarch"),
                    promoted,
                ],
            ),
            product(2, "Fedora", vec![repo(21, 2, Some("40"), "x86_64")]),
            unsyncable,
        ])
    }

    fn manager(client: FakeSyncControl) -> (SyncManager, Arc<FakeSyncControl>) {
        let client = Arc::new(client);
        let manager = SyncManager::new(
            Arc::new(catalog()),
            client.clone(),
            StateLabels::default(),
            FanOutConfig::default(),
        );
        (manager, client)
    }

    #[tokio::test]
    async fn test_cancel_sync() {
        let (manager, client) = manager(FakeSyncControl::default());

        manager.cancel_sync(11).await.unwrap();
        assert_eq!(*client.cancelled.lock().unwrap(), vec!["acme-repo-11".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_unknown_repository() {
        let (manager, client) = manager(FakeSyncControl::default());

        let err = manager.cancel_sync(404).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(client.cancelled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_propagates_remote_error() {
        let mut client = FakeSyncControl::default();
        client.cancel_errors.insert(
            "acme-repo-12".to_string(),
            AppError::not_found("Sync job"),
        );
        let (manager, _) = manager(client);

        assert!(manager.cancel_sync(12).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sync_product_uses_locker_repositories() {
        let (manager, client) = manager(FakeSyncControl::default());

        let results = manager.sync_product(1).await.unwrap();

        assert_eq!(results.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![11, 12]);
        assert_eq!(
            *client.started.lock().unwrap(),
            vec!["acme-repo-11".to_string(), "acme-repo-12".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sync_unknown_product() {
        let (manager, _) = manager(FakeSyncControl::default());
        assert!(manager.sync_product(404).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_organization_hierarchy_skips_unsyncable_products() {
        let (manager, _) = manager(FakeSyncControl::default());

        let tree = manager.organization_hierarchy(1).await.unwrap();

        let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["RHEL", "Fedora"]);
    }

    #[tokio::test]
    async fn test_organization_hierarchy_unknown_organization() {
        let (manager, _) = manager(FakeSyncControl::default());
        assert!(manager.organization_hierarchy(7).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_dashboard() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-11".to_string(),
            Ok(status("finished", Some(now()), Some(now()), 1536, 0)),
        );
        client.statuses.insert(
            "acme-repo-12".to_string(),
            Ok(status("running", Some(now()), None, 512, 256)),
        );
        client.statuses.insert(
            "acme-repo-21".to_string(),
            Err(AppError::remote_call("unreachable")),
        );
        let (manager, _) = manager(client);

        let view = manager.dashboard_at(1, now()).await.unwrap();

        assert_eq!(view.products.len(), 2);
        let ids: Vec<i64> = view.statuses.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![12, 11]);
        assert!(view.status_of(21).is_none());
        assert_eq!(
            view.status_of(11).unwrap().canonical_state,
            CanonicalSyncState::Finished
        );

        assert_eq!(view.summaries.len(), 2);
        assert_eq!(view.summaries[0].total_size_bytes, 2048);
        assert_eq!(view.summaries[0].size, "2 KB");
        assert_eq!(view.summaries[1].total_size_bytes, 0);
        assert_eq!(view.summaries[1].size, "0 Bytes");
    }

    #[tokio::test]
    async fn test_dashboard_summary_saturates() {
        let mut client = FakeSyncControl::default();
        for remote_id in ["acme-repo-11", "acme-repo-12"] {
            client.statuses.insert(
                remote_id.to_string(),
                Ok(status("finished", Some(now()), Some(now()), i64::MAX, 0)),
            );
        }
        let (manager, _) = manager(client);

        let view = manager.dashboard_at(1, now()).await.unwrap();

        assert_eq!(view.statuses.len(), 3);
        assert_eq!(view.summaries[0].total_size_bytes, i64::MAX);
        assert_eq!(view.summaries[0].size, "8192 PB");
    }
}
