//! Canonical sync job states and their display labels.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical state of a remote sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalSyncState {
    Waiting,
    Running,
    Finished,
    Error,
    Canceled,
    NotSynced,
}

impl CanonicalSyncState {
    /// Every canonical state, in display order.
    pub const ALL: [CanonicalSyncState; 6] = [
        Self::Waiting,
        Self::Running,
        Self::Finished,
        Self::Error,
        Self::Canceled,
        Self::NotSynced,
    ];

    /// Map a raw remote state token to its canonical state.
    ///
    /// Matching is exact and case-sensitive. Unrecognized tokens are an
    /// error rather than a fallback so protocol drift on the remote side
    /// shows up instead of being rendered as some plausible state.
    pub fn classify(raw: &str) -> Result<Self, AppError> {
        match raw {
            "waiting" => Ok(Self::Waiting),
            "running" => Ok(Self::Running),
            "finished" => Ok(Self::Finished),
            "error" => Ok(Self::Error),
            "canceled" => Ok(Self::Canceled),
            "not_synced" => Ok(Self::NotSynced),
            other => Err(AppError::unknown_state(other)),
        }
    }

    /// The token this state is known by on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Error => "error",
            Self::Canceled => "canceled",
            Self::NotSynced => "not_synced",
        }
    }

    /// Whether the state is terminal (or the repository was never synced).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Error | Self::Canceled | Self::NotSynced
        )
    }

    /// Whether a job in this state is still running.
    ///
    /// Both conditions must hold: the state is not settled AND no finish time
    /// has been recorded. A job that reports `running` after its finish time
    /// was set is treated as done.
    pub fn is_active(&self, finish_time: Option<DateTime<Utc>>) -> bool {
        !self.is_settled() && finish_time.is_none()
    }
}

impl std::fmt::Display for CanonicalSyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing phrase for each canonical state.
///
/// One field per state, so `label` is exhaustive at compile time. Loading
/// from a configuration map checks exhaustiveness at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLabels {
    pub waiting: String,
    pub running: String,
    pub finished: String,
    pub error: String,
    pub canceled: String,
    pub not_synced: String,
}

impl Default for StateLabels {
    fn default() -> Self {
        Self {
            waiting: "Queued.".to_string(),
            running: "Running.".to_string(),
            finished: "Sync complete.".to_string(),
            error: "Error syncing!".to_string(),
            canceled: "Canceled.".to_string(),
            not_synced: String::new(),
        }
    }
}

impl StateLabels {
    /// Build labels from a `state token -> label` map.
    ///
    /// Every canonical state must be present; unknown keys are rejected too.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, AppError> {
        for key in map.keys() {
            CanonicalSyncState::classify(key).map_err(|_| {
                AppError::config(format!("state_labels has unknown state '{}'", key))
            })?;
        }

        let take = |state: CanonicalSyncState| -> Result<String, AppError> {
            map.get(state.as_str()).cloned().ok_or_else(|| {
                AppError::config(format!("state_labels is missing '{}'", state.as_str()))
            })
        };

        Ok(Self {
            waiting: take(CanonicalSyncState::Waiting)?,
            running: take(CanonicalSyncState::Running)?,
            finished: take(CanonicalSyncState::Finished)?,
            error: take(CanonicalSyncState::Error)?,
            canceled: take(CanonicalSyncState::Canceled)?,
            not_synced: take(CanonicalSyncState::NotSynced)?,
        })
    }

    /// Display label for a state.
    pub fn label(&self, state: CanonicalSyncState) -> &str {
        match state {
            CanonicalSyncState::Waiting => &self.waiting,
            CanonicalSyncState::Running => &self.running,
            CanonicalSyncState::Finished => &self.finished,
            CanonicalSyncState::Error => &self.error,
            CanonicalSyncState::Canceled => &self.canceled,
            CanonicalSyncState::NotSynced => &self.not_synced,
        }
    }
}
