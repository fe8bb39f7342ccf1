//! JSON fixtures for seeding a store
//!
//! ```json
//! {
//!   "accounts": [{ "id": "...", "nickname": "..." }],
//!   "relationships": [{ "sourceName": "Account", "targetName": "AppStorage",
//!                       "sourceId": "...", "targetId": "...", "as": "appStorage" }],
//!   "app_storages": [{ "id": "...", "appId": "Editor", "bucket": { } }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::account::Account;
use crate::app_storage::AppStorage;
use crate::relationship::Relationship;
use crate::storage::SqliteStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub app_storages: Vec<AppStorage>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn len(&self) -> usize {
        self.accounts.len() + self.relationships.len() + self.app_storages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insert every document of `fixture` in one transaction
pub fn import_fixture(store: &SqliteStore, fixture: &Fixture) -> Result<usize> {
    store.begin_transaction()?;
    match insert_all(store, fixture) {
        Ok(()) => {
            store.commit()?;
            tracing::info!("Imported {} documents", fixture.len());
            Ok(fixture.len())
        }
        Err(e) => {
            store.rollback()?;
            Err(e)
        }
    }
}

fn insert_all(store: &SqliteStore, fixture: &Fixture) -> Result<()> {
    for account in &fixture.accounts {
        store.insert_account(account)?;
    }
    for rel in &fixture.relationships {
        store.insert_relationship(rel)?;
    }
    for storage in &fixture.app_storages {
        store.insert_app_storage(storage)?;
    }
    Ok(())
}
