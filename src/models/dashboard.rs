//! Organization sync dashboard.

use crate::models::hierarchy::HierarchyNode;
use crate::models::sync_status::SyncJobStatus;
use serde::{Deserialize, Serialize};

/// Per-product size roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,

    /// Sum of the reported total sizes of the product's repositories.
    pub total_size_bytes: i64,

    /// `total_size_bytes` in human-readable form.
    pub size: String,
}

/// Repository tree of the syncable products plus the latest status per repository.
///
/// Repositories whose status lookup failed have no entry in `statuses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub products: Vec<HierarchyNode>,
    pub statuses: Vec<SyncJobStatus>,
    pub summaries: Vec<ProductSummary>,
}

impl DashboardView {
    /// Latest status for a repository, if it was reported.
    pub fn status_of(&self, repository_id: i64) -> Option<&SyncJobStatus> {
        self.statuses.iter().find(|s| s.id == repository_id)
    }
}
