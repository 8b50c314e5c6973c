//! In-memory catalog and remote fakes shared by service tests.

use crate::error::AppError;
use crate::models::catalog::{Organization, Product, Repository};
use crate::services::catalog::Catalog;
use crate::services::sync_client::{RemoteProgress, RemoteSyncStatus, StartedSync, SyncControl};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub const LOCKER: i64 = 10;

pub fn org() -> Organization {
    Organization {
        id: 1,
        name: "ACME".to_string(),
        label: "acme".to_string(),
        locker_environment_id: LOCKER,
    }
}

pub fn repo(id: i64, product_id: i64, minor: Option<&str>, arch: &str) -> Repository {
    Repository {
        id,
        product_id,
        environment_id: LOCKER,
        name: format!("repo-{}", id),
        remote_id: format!("acme-repo-{}", id),
        minor: minor.map(str::to_string),
        arch: arch.to_string(),
    }
}

pub fn product(id: i64, name: &str, repositories: Vec<Repository>) -> Product {
    Product {
        id,
        organization_id: 1,
        provider_id: 1,
        name: name.to_string(),
        syncable: true,
        repositories,
    }
}

pub fn status(
    state: &str,
    start: Option<DateTime<Utc>>,
    finish: Option<DateTime<Utc>>,
    total_size: i64,
    size_left: i64,
) -> RemoteSyncStatus {
    RemoteSyncStatus {
        state: state.to_string(),
        job_id: Some(format!("job-{}", state)),
        start_time: start,
        finish_time: finish,
        progress: RemoteProgress {
            total_count: 10,
            items_left: 2,
            total_size,
            size_left,
        },
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub organizations: Vec<Organization>,
    pub products: Vec<Product>,
}

impl FakeCatalog {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            organizations: vec![org()],
            products,
        }
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn repository(&self, id: i64) -> Result<Repository, AppError> {
        self.products
            .iter()
            .flat_map(|p| p.repositories.iter())
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found_with_id("Repository", id))
    }

    async fn product(&self, id: i64) -> Result<Product, AppError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found_with_id("Product", id))
    }

    async fn organization(&self, id: i64) -> Result<Organization, AppError> {
        self.organizations
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found_with_id("Organization", id))
    }

    async fn organization_products(&self, organization_id: i64) -> Result<Vec<Product>, AppError> {
        self.organization(organization_id).await?;
        Ok(self
            .products
            .iter()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

/// Remote fake answering from scripted per-repository responses.
///
/// Repositories without a scripted start answer `waiting`; without a
/// scripted status they answer `not_synced`.
#[derive(Default)]
pub struct FakeSyncControl {
    pub starts: HashMap<String, Result<StartedSync, AppError>>,
    pub statuses: HashMap<String, Result<RemoteSyncStatus, AppError>>,
    pub cancel_errors: HashMap<String, AppError>,
    pub started: Mutex<Vec<String>>,
    pub cancelled: Mutex<Vec<String>>,
}

#[async_trait]
impl SyncControl for FakeSyncControl {
    async fn start_sync(&self, remote_id: &str) -> Result<StartedSync, AppError> {
        self.started.lock().unwrap().push(remote_id.to_string());
        match self.starts.get(remote_id) {
            Some(result) => result.clone(),
            None => Ok(StartedSync {
                state: "waiting".to_string(),
                job_id: Some(format!("job-{}", remote_id)),
            }),
        }
    }

    async fn sync_status(&self, remote_id: &str) -> Result<RemoteSyncStatus, AppError> {
        match self.statuses.get(remote_id) {
            Some(result) => result.clone(),
            None => Ok(RemoteSyncStatus {
                state: "not_synced".to_string(),
                job_id: None,
                start_time: None,
                finish_time: None,
                progress: RemoteProgress::default(),
            }),
        }
    }

    async fn cancel_sync(&self, remote_id: &str) -> Result<(), AppError> {
        if let Some(err) = self.cancel_errors.get(remote_id) {
            return Err(err.clone());
        }
        self.cancelled.lock().unwrap().push(remote_id.to_string());
        Ok(())
    }
}
