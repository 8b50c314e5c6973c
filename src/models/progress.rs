//! Sync job progress counters.

use crate::models::sync_state::CanonicalSyncState;
use serde::{Deserialize, Serialize};

/// Percentage reported for a job in the error state.
pub const ERROR_PERCENT: f64 = -1.0;

/// Progress of a single sync job.
///
/// Serializes as `{count, left, totalSize, progress}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressModel {
    /// Total number of items in the job.
    #[serde(rename = "count")]
    pub total_count: i64,

    /// Items not yet transferred.
    #[serde(rename = "left")]
    pub items_left: i64,

    /// Total content size in bytes.
    #[serde(rename = "totalSize")]
    pub total_size_bytes: i64,

    /// Completion percentage, or [`ERROR_PERCENT`] for an errored job.
    #[serde(rename = "progress")]
    pub percent_complete: f64,
}

impl ProgressModel {
    /// Compute progress from raw counters.
    ///
    /// An errored job reports -1 whatever its sizes say. A job with no known
    /// size reports 0. Negative sizes are passed through, so the percentage
    /// can leave [-1, 100] when the remote reports nonsense.
    pub fn compute(
        total_size: i64,
        size_left: i64,
        total_count: i64,
        items_left: i64,
        state: CanonicalSyncState,
    ) -> Self {
        let percent_complete = if state == CanonicalSyncState::Error {
            ERROR_PERCENT
        } else if total_size == 0 {
            0.0
        } else {
            (total_size as f64 - size_left as f64) / total_size as f64 * 100.0
        };

        Self {
            total_count,
            items_left,
            total_size_bytes: total_size,
            percent_complete,
        }
    }

    /// Whether this progress belongs to an errored job.
    pub fn is_error(&self) -> bool {
        self.percent_complete == ERROR_PERCENT
    }
}
