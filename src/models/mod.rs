//! Data models for the sync status core.
//!
//! Catalog records are read from the local SQLite catalog; everything else
//! is a value built per request and serialized to the caller.

pub mod catalog;
pub mod dashboard;
pub mod hierarchy;
pub mod progress;
pub mod sync_state;
pub mod sync_status;

// Re-exports for convenient access
pub use catalog::{Organization, Product, Repository};
pub use dashboard::{DashboardView, ProductSummary};
pub use hierarchy::{HierarchyNode, NodeKind};
pub use progress::ProgressModel;
pub use sync_state::{CanonicalSyncState, StateLabels};
pub use sync_status::{DispatchResult, SyncJobStatus};
