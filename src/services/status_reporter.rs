//! Fetches and normalizes the current sync job status of repositories.

use crate::config::FanOutConfig;
use crate::error::AppError;
use crate::models::catalog::Repository;
use crate::models::progress::ProgressModel;
use crate::models::sync_state::{CanonicalSyncState, StateLabels};
use crate::models::sync_status::SyncJobStatus;
use crate::services::catalog::Catalog;
use crate::services::fan_out;
use crate::services::format;
use crate::services::sync_client::{RemoteSyncStatus, SyncControl};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Produces a [`SyncJobStatus`] per repository for polling clients.
#[derive(Clone)]
pub struct StatusReporter {
    catalog: Arc<dyn Catalog>,
    client: Arc<dyn SyncControl>,
    labels: Arc<StateLabels>,
    fan_out: FanOutConfig,
}

impl StatusReporter {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        client: Arc<dyn SyncControl>,
        labels: Arc<StateLabels>,
        fan_out: FanOutConfig,
    ) -> Self {
        Self {
            catalog,
            client,
            labels,
            fan_out,
        }
    }

    /// Report the status of each repository as of now.
    pub async fn report_status(&self, repository_ids: &[i64]) -> Vec<SyncJobStatus> {
        self.report_status_at(repository_ids, Utc::now()).await
    }

    /// Report the status of each repository, phrasing times relative to `now`.
    ///
    /// Lookups that fail are logged and left out, so the result can be
    /// shorter than the input; order otherwise follows the input.
    pub async fn report_status_at(
        &self,
        repository_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Vec<SyncJobStatus> {
        let catalog = Arc::clone(&self.catalog);
        let client = Arc::clone(&self.client);

        let outcomes = fan_out::run_bounded(repository_ids.to_vec(), self.fan_out, move |id| {
            let catalog = Arc::clone(&catalog);
            let client = Arc::clone(&client);
            async move {
                let repo = catalog.repository(id).await?;
                let remote = client.sync_status(&repo.remote_id).await?;
                Ok((repo, remote))
            }
        })
        .await;

        self.collect(outcomes, now)
    }

    /// Report the status of already-resolved repositories.
    pub async fn report_repositories_at(
        &self,
        repositories: Vec<Repository>,
        now: DateTime<Utc>,
    ) -> Vec<SyncJobStatus> {
        let client = Arc::clone(&self.client);

        let outcomes = fan_out::run_bounded(repositories, self.fan_out, move |repo| {
            let client = Arc::clone(&client);
            async move {
                let remote = client.sync_status(&repo.remote_id).await?;
                Ok((repo, remote))
            }
        })
        .await;

        let outcomes = outcomes
            .into_iter()
            .map(|(repo, outcome)| (repo.id, outcome))
            .collect();
        self.collect(outcomes, now)
    }

    fn collect(
        &self,
        outcomes: Vec<(i64, Result<(Repository, RemoteSyncStatus), AppError>)>,
        now: DateTime<Utc>,
    ) -> Vec<SyncJobStatus> {
        outcomes
            .into_iter()
            .filter_map(|(id, outcome)| {
                let normalized = outcome
                    .and_then(|(repo, remote)| normalize(&repo, &remote, &self.labels, now));
                match normalized {
                    Ok(status) => Some(status),
                    Err(e) => {
                        log::warn!("[status] Skipping repository {}: {}", id, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Build the normalized status record for one repository.
pub fn normalize(
    repo: &Repository,
    remote: &RemoteSyncStatus,
    labels: &StateLabels,
    now: DateTime<Utc>,
) -> Result<SyncJobStatus, AppError> {
    let state = CanonicalSyncState::classify(&remote.state)?;
    let counters = remote.progress;
    let progress = ProgressModel::compute(
        counters.total_size,
        counters.size_left,
        counters.total_count,
        counters.items_left,
        state,
    );

    let duration = match (remote.start_time, remote.finish_time) {
        (Some(start), Some(finish)) => Some(format::describe_duration(start, finish)),
        _ => None,
    };

    Ok(SyncJobStatus {
        id: repo.id,
        product_id: repo.product_id,
        sync_id: remote.job_id.clone(),
        canonical_state: state,
        state: labels.label(state).to_string(),
        raw_state: remote.state.clone(),
        progress,
        started_at: remote.start_time,
        finished_at: remote.finish_time,
        start_time: remote.start_time.map(|t| format::relative_time(t, now)),
        finish_time: remote.finish_time.map(|t| format::relative_time(t, now)),
        duration,
        packages: counters.total_count,
        size: format::human_size(counters.total_size),
        is_running: state.is_active(remote.finish_time),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{product, repo, status, FakeCatalog, FakeSyncControl};
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, s).unwrap()
    }

    fn reporter(client: FakeSyncControl) -> StatusReporter {
        let catalog = FakeCatalog::with_products(vec![product(
            1,
            "RHEL",
            vec![
                repo(11, 1, Some("6"), "x86_64"),
                repo(12, 1, Some("6"), "ppc64"),
                repo(13, 1, None, "noarch"),
            ],
        )]);
        StatusReporter::new(
            Arc::new(catalog),
            Arc::new(client),
            Arc::new(StateLabels::default()),
            FanOutConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_finished_job_fields() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-11".to_string(),
            Ok(status("finished", Some(at(10, 0, 0)), Some(at(10, 2, 5)), 2048, 0)),
        );
        let reporter = reporter(client);

        let statuses = reporter.report_status_at(&[11], at(12, 0, 0)).await;

        assert_eq!(statuses.len(), 1);
        let s = &statuses[0];
        assert_eq!(s.id, 11);
        assert_eq!(s.product_id, 1);
        assert_eq!(s.canonical_state, CanonicalSyncState::Finished);
        assert_eq!(s.state, "Sync complete.");
        assert_eq!(s.raw_state, "finished");
        assert_eq!(s.sync_id.as_deref(), Some("job-finished"));
        assert_eq!(s.progress.percent_complete, 100.0);
        assert_eq!(s.duration.as_deref(), Some("2m 5s"));
        assert_eq!(s.start_time.as_deref(), Some("about 2 hours ago"));
        assert_eq!(s.finish_time.as_deref(), Some("about 1 hour ago"));
        assert_eq!(s.packages, 10);
        assert_eq!(s.size, "2 KB");
        assert!(!s.is_running);
    }

    #[tokio::test]
    async fn test_running_job_has_no_duration() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-12".to_string(),
            Ok(status("running", Some(at(11, 55, 0)), None, 4096, 1024)),
        );
        let reporter = reporter(client);

        let statuses = reporter.report_status_at(&[12], at(12, 0, 0)).await;

        let s = &statuses[0];
        assert!(s.is_running);
        assert!(s.duration.is_none());
        assert!(s.finish_time.is_none());
        assert_eq!(s.start_time.as_deref(), Some("5 minutes ago"));
        assert_eq!(s.progress.percent_complete, 75.0);
    }

    #[tokio::test]
    async fn test_stale_running_state_after_finish_is_not_running() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-11".to_string(),
            Ok(status("running", Some(at(10, 0, 0)), Some(at(10, 1, 0)), 100, 0)),
        );
        let reporter = reporter(client);

        let statuses = reporter.report_status_at(&[11], at(12, 0, 0)).await;
        assert!(!statuses[0].is_running);
    }

    #[tokio::test]
    async fn test_error_job_reports_minus_one() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-11".to_string(),
            Ok(status("error", Some(at(10, 0, 0)), Some(at(10, 1, 0)), 100, 40)),
        );
        let reporter = reporter(client);

        let statuses = reporter.report_status_at(&[11], at(12, 0, 0)).await;
        assert_eq!(statuses[0].progress.percent_complete, -1.0);
        assert_eq!(statuses[0].state, "Error syncing!");
    }

    #[tokio::test]
    async fn test_failed_lookups_are_skipped() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-12".to_string(),
            Err(AppError::remote_call("connection reset")),
        );
        client.statuses.insert(
            "acme-repo-13".to_string(),
            Ok(status("paused", None, None, 0, 0)),
        );
        let reporter = reporter(client);

        let statuses = reporter.report_status_at(&[404, 11, 12, 13], at(12, 0, 0)).await;

        let ids: Vec<i64> = statuses.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![11]);
        assert_eq!(statuses[0].canonical_state, CanonicalSyncState::NotSynced);
        assert_eq!(statuses[0].size, "0 Bytes");
    }

    #[tokio::test]
    async fn test_extreme_sizes_are_reported() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-11".to_string(),
            Ok(status("running", None, None, i64::MAX, -1)),
        );
        client.statuses.insert(
            "acme-repo-12".to_string(),
            Ok(status("running", None, None, i64::MIN, 0)),
        );
        let reporter = reporter(client);

        let statuses = reporter.report_status_at(&[11, 12, 13], at(12, 0, 0)).await;

        assert_eq!(statuses.len(), 3);
        assert!((statuses[0].progress.percent_complete - 100.0).abs() < 1e-9);
        assert_eq!(statuses[0].size, "8192 PB");
        assert_eq!(statuses[1].size, "-8192 PB");
    }

    #[tokio::test]
    async fn test_report_is_idempotent() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-11".to_string(),
            Ok(status("running", Some(at(11, 0, 0)), None, 1000, 250)),
        );
        let reporter = reporter(client);
        let now = at(12, 0, 0);

        let first = serde_json::to_string(&reporter.report_status_at(&[11, 12, 13], now).await).unwrap();
        let second = serde_json::to_string(&reporter.report_status_at(&[11, 12, 13], now).await).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_report_resolved_repositories() {
        let mut client = FakeSyncControl::default();
        client.statuses.insert(
            "acme-repo-12".to_string(),
            Ok(status("waiting", None, None, 0, 0)),
        );
        let reporter = reporter(client);

        let repos = vec![repo(12, 1, Some("6"), "ppc64"), repo(13, 1, None, "noarch")];
        let statuses = reporter.report_repositories_at(repos, at(12, 0, 0)).await;

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].state, "Queued.");
        assert!(statuses[0].is_running);
        assert_eq!(statuses[1].canonical_state, CanonicalSyncState::NotSynced);
    }
}
