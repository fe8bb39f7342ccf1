//! Storage Layer - SQLite-backed document collections
//!
//! Each table acts as one collection of documents:
//! - accounts(id, nickname)
//! - relationships(id, source_name, target_name, source_id, target_id, role)
//! - app_storages(id, app_id, bucket)
//! - combined_app_storages(id, account_id, bucket)
//!
//! Buckets are stored as JSON text.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats};

use crate::Result;
use crate::account::{Account, AccountFilter};
use crate::app_storage::{AppStorage, CombinedAppStorage};
use crate::object_id::ObjectId;
use crate::relationship::{Relationship, RelationshipFilter};

/// Outcome of a single-document lookup.
///
/// "Not found" is an expected answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

/// Document operations the migration needs from a store.
///
/// All calls are blocking. Errors are store failures and must abort the run.
pub trait MigrationStore {
    /// One page of accounts matching `filter`, ascending by id
    fn accounts_page(&self, filter: &AccountFilter, skip: usize, limit: usize) -> Result<Vec<Account>>;

    /// All relationships matching `filter`, in insertion order
    fn find_relationships(&self, filter: &RelationshipFilter) -> Result<Vec<Relationship>>;

    /// Existing app storages among `ids`; missing ids are skipped
    fn app_storages_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<AppStorage>>;

    fn find_combined_by_account_id(&self, account_id: ObjectId) -> Result<Lookup<CombinedAppStorage>>;

    /// Insert a new combined record
    fn create_combined(&self, doc: &CombinedAppStorage) -> Result<()>;

    /// Replace the stored combined record with the same id
    fn update_combined(&self, doc: &CombinedAppStorage) -> Result<()>;
}
