//! Normalized sync status records returned to clients.

use crate::error::AppError;
use crate::models::progress::ProgressModel;
use crate::models::sync_state::CanonicalSyncState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one repository's sync job, built fresh on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJobStatus {
    /// Repository ID.
    pub id: i64,

    /// Owning product ID.
    pub product_id: i64,

    /// Remote job ID, if the repository has ever been synced.
    pub sync_id: Option<String>,

    pub canonical_state: CanonicalSyncState,

    /// Display label for the canonical state.
    pub state: String,

    /// State token exactly as the remote reported it.
    pub raw_state: String,

    pub progress: ProgressModel,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Relative phrase for `started_at`, e.g. "5 minutes ago".
    pub start_time: Option<String>,

    /// Relative phrase for `finished_at`.
    pub finish_time: Option<String>,

    /// Elapsed time, only when both timestamps are known.
    pub duration: Option<String>,

    /// Number of packages (items) in the job.
    pub packages: i64,

    /// Human-readable total size.
    pub size: String,

    pub is_running: bool,
}

/// Outcome of dispatching a sync for one repository.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DispatchResult {
    Dispatched {
        id: i64,
        #[serde(rename = "productId")]
        product_id: i64,
        state: CanonicalSyncState,
        #[serde(rename = "syncId")]
        sync_id: Option<String>,
    },
    Failed {
        id: i64,
        error: AppError,
    },
}

impl DispatchResult {
    /// Repository ID this result belongs to.
    pub fn id(&self) -> i64 {
        match self {
            Self::Dispatched { id, .. } | Self::Failed { id, .. } => *id,
        }
    }

    /// Error for a failed dispatch.
    pub fn error(&self) -> Option<&AppError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Dispatched { .. } => None,
        }
    }

    /// Whether the dispatch was rejected because a sync is already running.
    pub fn is_conflict(&self) -> bool {
        self.error().is_some_and(AppError::is_conflict)
    }
}
