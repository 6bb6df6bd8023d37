//! Snapshots module - daily closing-balance records per account.

mod snapshots_model;
mod snapshots_service;
mod snapshots_traits;

#[cfg(test)]
mod snapshots_service_tests;

// Re-export the public interface
pub use snapshots_model::{AccountSnapshot, NewSnapshot, SnapshotUpdate};
pub use snapshots_service::SnapshotService;
pub use snapshots_traits::{SnapshotRepositoryTrait, SnapshotServiceTrait};
