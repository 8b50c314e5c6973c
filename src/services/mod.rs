//! Business logic services.
//!
//! The remote sync service and the catalog sit behind the [`SyncControl`]
//! and [`Catalog`] traits so the core can be tested without either.

pub mod catalog;
pub mod fan_out;
pub mod format;
pub mod hierarchy_builder;
pub mod server;
pub mod status_reporter;
pub mod sync_api;
pub mod sync_client;
pub mod sync_dispatcher;
pub mod sync_manager;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{Catalog, SqliteCatalog};
pub use status_reporter::StatusReporter;
pub use sync_client::{SyncControl, SyncControlClient};
pub use sync_dispatcher::SyncDispatcher;
pub use sync_manager::SyncManager;
