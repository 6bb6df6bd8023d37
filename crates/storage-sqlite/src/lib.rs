//! SQLite storage implementation for Tradebook.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `tradebook-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor that serializes every mutation
//! - Repository implementations for accounts, ledger entries, trades, and
//!   snapshots
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. Everything above it is database-agnostic and works with the traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod accounts;
pub mod snapshots;
pub mod trades;
pub mod transactions;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from tradebook-core for convenience
pub use tradebook_core::errors::{DatabaseError, Error, Result};
