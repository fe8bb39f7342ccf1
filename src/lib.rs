//! # AppStorage Migrator
//!
//! Consolidates an account's legacy per-application storage documents into
//! a single combined record.
//!
//! The migrator provides:
//! - Typed documents for accounts, relationships and app storages
//! - SQLite-backed document collections
//! - A paged iterator over the accounts collection
//! - The merge engine (size tie-break, first-write-wins, denylist)

pub mod object_id;
pub mod account;
pub mod relationship;
pub mod bucket;
pub mod app_storage;
pub mod storage;
pub mod iter;
pub mod resolve;
pub mod merge;
pub mod migrator;
pub mod config;
pub mod fixture;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use object_id::ObjectId;
pub use account::Account;
pub use relationship::{Relationship, RelationshipFilter};
pub use bucket::{AppData, Bucket};
pub use app_storage::{AppStorage, CombinedAppStorage};
pub use storage::{Lookup, MigrationStore, SqliteStore};
pub use merge::{Denylist, MergeEngine};
pub use migrator::{AccountOutcome, MigrationStats, Migrator};

/// Result type alias for migrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for migrator operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Duplicate document: {0}")]
    DuplicateDocument(String),
}
