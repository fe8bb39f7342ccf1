//! Per-account migration: resolve → fetch → merge → write

use std::fmt;

use crate::Result;
use crate::account::Account;
use crate::iter::{iter_accounts, IterOptions};
use crate::merge::{MergeDecision, MergeEngine};
use crate::resolve::{fetch_app_storages, resolve_app_storage_ids};
use crate::storage::MigrationStore;

/// How one account ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    /// No app storage relationships
    NoRelationships,
    /// Relationships exist but none has a valid target id
    NoValidIds,
    /// Every linked app storage is gone
    NoAppStorages,
    /// A new combined record was written
    Created { apps: usize },
    /// The existing combined record was updated
    Updated { apps: usize },
}

impl AccountOutcome {
    pub fn is_write(&self) -> bool {
        matches!(self, AccountOutcome::Created { .. } | AccountOutcome::Updated { .. })
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStats {
    pub visited: usize,
    pub created: usize,
    pub updated: usize,
    pub no_relationships: usize,
    pub no_valid_ids: usize,
    pub no_app_storages: usize,
}

impl MigrationStats {
    pub fn record(&mut self, outcome: AccountOutcome) {
        match outcome {
            AccountOutcome::NoRelationships => self.no_relationships += 1,
            AccountOutcome::NoValidIds => self.no_valid_ids += 1,
            AccountOutcome::NoAppStorages => self.no_app_storages += 1,
            AccountOutcome::Created { .. } => self.created += 1,
            AccountOutcome::Updated { .. } => self.updated += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.no_relationships + self.no_valid_ids + self.no_app_storages
    }
}

impl fmt::Display for MigrationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration Stats:")?;
        writeln!(f, "  Accounts visited: {}", self.visited)?;
        writeln!(f, "  Created: {}", self.created)?;
        writeln!(f, "  Updated: {}", self.updated)?;
        writeln!(f, "  No relationships: {}", self.no_relationships)?;
        writeln!(f, "  No valid ids: {}", self.no_valid_ids)?;
        writeln!(f, "  No app storages: {}", self.no_app_storages)
    }
}

/// Drives the migration of accounts against one store.
pub struct Migrator<'a, S: MigrationStore + ?Sized> {
    store: &'a S,
    engine: MergeEngine,
    dry_run: bool,
}

impl<'a, S: MigrationStore + ?Sized> Migrator<'a, S> {
    pub fn new(store: &'a S, engine: MergeEngine) -> Self {
        Self {
            store,
            engine,
            dry_run: false,
        }
    }

    /// Merge without writing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Migrate every account selected by `options`.
    ///
    /// Stops at the first store error; records written before it stay written.
    pub fn run(&self, options: &IterOptions) -> Result<MigrationStats> {
        self.run_with(options, |_, _| {})
    }

    /// Like [`Migrator::run`], reporting each account's outcome to `observe`
    pub fn run_with<F>(&self, options: &IterOptions, mut observe: F) -> Result<MigrationStats>
    where
        F: FnMut(&Account, AccountOutcome),
    {
        let mut stats = MigrationStats::default();
        let visited = iter_accounts(self.store, options, |account| {
            let outcome = self.process_account(account)?;
            stats.record(outcome);
            observe(account, outcome);
            Ok(())
        })?;
        stats.visited = visited;
        Ok(stats)
    }

    /// Migrate a single account
    pub fn process_account(&self, account: &Account) -> Result<AccountOutcome> {
        let targets = resolve_app_storage_ids(self.store, account.id)?;
        if !targets.has_edges() {
            tracing::info!("No app storage relationships for {}", account.nickname);
            return Ok(AccountOutcome::NoRelationships);
        }
        if targets.ids.is_empty() {
            tracing::info!(
                "All {} relationship ids of {} are not valid",
                targets.invalid(),
                account.nickname
            );
            return Ok(AccountOutcome::NoValidIds);
        }

        let storages = fetch_app_storages(self.store, &targets.ids)?;
        if storages.is_empty() {
            tracing::info!("No app storages found for {}", account.nickname);
            return Ok(AccountOutcome::NoAppStorages);
        }

        let fresh = self.engine.aggregate(storages);
        let existing = self.store.find_combined_by_account_id(account.id)?;
        let decision = self.engine.reconcile(account.id, existing, fresh);
        let apps = decision.record().bucket.len();

        match &decision {
            MergeDecision::Create(doc) => {
                tracing::info!("Creating combined app storage for {}", account.nickname);
                if !self.dry_run {
                    self.store.create_combined(doc)?;
                }
                Ok(AccountOutcome::Created { apps })
            }
            MergeDecision::Update(doc) => {
                tracing::info!("Updating combined app storage for {}", account.nickname);
                if !self.dry_run {
                    self.store.update_combined(doc)?;
                }
                Ok(AccountOutcome::Updated { apps })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::account::AccountFilter;
    use crate::app_storage::{AppStorage, CombinedAppStorage};
    use crate::bucket::Bucket;
    use crate::merge::Denylist;
    use crate::object_id::ObjectId;
    use crate::relationship::{Relationship, RelationshipFilter};
    use crate::storage::{Lookup, SqliteStore};
    use serde_json::json;
    use std::cell::RefCell;

    fn engine() -> MergeEngine {
        MergeEngine::new(Denylist::builtin())
    }

    fn bucket(value: serde_json::Value) -> Bucket {
        serde_json::from_value(value).unwrap()
    }

    /// Seeds an account linked to the given storages
    fn seed(store: &SqliteStore, nickname: &str, storages: &[(&str, serde_json::Value)]) -> Account {
        let account = Account::new(ObjectId::new(), nickname);
        store.insert_account(&account).unwrap();
        for (app_id, data) in storages {
            let storage = AppStorage::new(*app_id, serde_json::from_value(data.clone()).unwrap());
            store.insert_app_storage(&storage).unwrap();
            store
                .insert_relationship(&Relationship::app_storage(account.id, storage.id.to_hex()))
                .unwrap();
        }
        account
    }

    fn combined(store: &SqliteStore, account: &Account) -> Option<CombinedAppStorage> {
        store.find_combined_by_account_id(account.id).unwrap().into_option()
    }

    /// Wraps a store, counting writes and optionally failing reads or writes
    struct Recording<'a> {
        inner: &'a SqliteStore,
        creates: RefCell<usize>,
        updates: RefCell<usize>,
        fail_writes: bool,
        fail_combined_reads: bool,
    }

    impl<'a> Recording<'a> {
        fn new(inner: &'a SqliteStore) -> Self {
            Self {
                inner,
                creates: RefCell::new(0),
                updates: RefCell::new(0),
                fail_writes: false,
                fail_combined_reads: false,
            }
        }
    }

    impl MigrationStore for Recording<'_> {
        fn accounts_page(&self, filter: &AccountFilter, skip: usize, limit: usize) -> Result<Vec<Account>> {
            self.inner.accounts_page(filter, skip, limit)
        }

        fn find_relationships(&self, filter: &RelationshipFilter) -> Result<Vec<Relationship>> {
            self.inner.find_relationships(filter)
        }

        fn app_storages_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<AppStorage>> {
            self.inner.app_storages_by_ids(ids)
        }

        fn find_combined_by_account_id(&self, account_id: ObjectId) -> Result<Lookup<CombinedAppStorage>> {
            if self.fail_combined_reads {
                return Err(Error::Io(std::io::Error::other("connection reset")));
            }
            self.inner.find_combined_by_account_id(account_id)
        }

        fn create_combined(&self, doc: &CombinedAppStorage) -> Result<()> {
            *self.creates.borrow_mut() += 1;
            if self.fail_writes {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.inner.create_combined(doc)
        }

        fn update_combined(&self, doc: &CombinedAppStorage) -> Result<()> {
            *self.updates.borrow_mut() += 1;
            if self.fail_writes {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.inner.update_combined(doc)
        }
    }

    #[test]
    fn test_creates_record_on_first_run() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "cihangir", &[
            ("Editor", json!({ "theme": "dark" })),
            ("Terminal", json!({ "font": 12 })),
        ]);

        let outcome = Migrator::new(&store, engine()).process_account(&account).unwrap();
        assert_eq!(outcome, AccountOutcome::Created { apps: 2 });

        let doc = combined(&store, &account).unwrap();
        assert_eq!(
            doc.bucket,
            bucket(json!({
                "Editor": { "data": { "theme": "dark" } },
                "Terminal": { "data": { "font": 12 } }
            }))
        );
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "sinan", &[
            ("Editor", json!({ "a": 1, "b": 2, "c": 3 })),
            ("Editor", json!({ "a": 1, "b": 2, "c": 3, "d": 4, "e": 5 })),
            ("Home", json!({ "x": 1 })),
        ]);
        let migrator = Migrator::new(&store, engine());

        migrator.process_account(&account).unwrap();
        let first = combined(&store, &account).unwrap();

        let outcome = migrator.process_account(&account).unwrap();
        assert_eq!(outcome, AccountOutcome::Updated { apps: 1 });
        assert_eq!(combined(&store, &account).unwrap(), first);
        assert_eq!(first.bucket.get("Editor").unwrap().key_count(), 5);
        assert_eq!(store.count_combined().unwrap(), 1);
    }

    #[test]
    fn test_existing_values_survive_new_storages() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "devrim", &[("App", json!({ "k1": "new", "k2": "v2" }))]);
        store
            .create_combined(&CombinedAppStorage::new(
                account.id,
                bucket(json!({ "App": { "data": { "k1": "old" } } })),
            ))
            .unwrap();

        let outcome = Migrator::new(&store, engine()).process_account(&account).unwrap();
        assert_eq!(outcome, AccountOutcome::Updated { apps: 1 });
        assert_eq!(
            combined(&store, &account).unwrap().bucket,
            bucket(json!({ "App": { "data": { "k1": "old", "k2": "v2" } } }))
        );
    }

    #[test]
    fn test_no_relationships_makes_no_writes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "lonely", &[]);
        let recording = Recording::new(&store);

        let outcome = Migrator::new(&recording, engine()).process_account(&account).unwrap();
        assert_eq!(outcome, AccountOutcome::NoRelationships);
        assert!(!outcome.is_write());
        assert_eq!(*recording.creates.borrow(), 0);
        assert_eq!(*recording.updates.borrow(), 0);
    }

    #[test]
    fn test_invalid_ids_and_missing_storages_are_skipped() {
        let store = SqliteStore::open_in_memory().unwrap();
        let broken = seed(&store, "broken", &[]);
        store.insert_relationship(&Relationship::app_storage(broken.id, "nope")).unwrap();

        let dangling = seed(&store, "dangling", &[]);
        store
            .insert_relationship(&Relationship::app_storage(dangling.id, ObjectId::new().to_hex()))
            .unwrap();

        let migrator = Migrator::new(&store, engine());
        assert_eq!(migrator.process_account(&broken).unwrap(), AccountOutcome::NoValidIds);
        assert_eq!(migrator.process_account(&dangling).unwrap(), AccountOutcome::NoAppStorages);
        assert_eq!(store.count_combined().unwrap(), 0);
    }

    #[test]
    fn test_denylisted_only_still_writes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "old-timer", &[("Activity", json!({ "seen": true }))]);

        let outcome = Migrator::new(&store, engine()).process_account(&account).unwrap();
        assert_eq!(outcome, AccountOutcome::Created { apps: 0 });
        assert!(outcome.is_write());
        assert!(combined(&store, &account).unwrap().bucket.is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "careful", &[("Editor", json!({ "a": 1 }))]);

        let outcome = Migrator::new(&store, engine())
            .dry_run(true)
            .process_account(&account)
            .unwrap();
        assert_eq!(outcome, AccountOutcome::Created { apps: 1 });
        assert!(combined(&store, &account).is_none());
    }

    #[test]
    fn test_run_collects_stats() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed(&store, "a", &[("Editor", json!({ "a": 1 }))]);
        seed(&store, "b", &[]);
        seed(&store, "c", &[("Terminal", json!({}))]);

        let mut observed = Vec::new();
        let stats = Migrator::new(&store, engine())
            .run_with(&IterOptions::default(), |account, outcome| {
                observed.push((account.nickname.clone(), outcome));
            })
            .unwrap();

        assert_eq!(stats.visited, 3);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.no_relationships, 1);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(observed.len(), 3);
    }

    #[test]
    fn test_write_error_aborts_run() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed(&store, "a", &[("Editor", json!({ "a": 1 }))]);
        seed(&store, "b", &[("Editor", json!({ "b": 1 }))]);
        let mut recording = Recording::new(&store);
        recording.fail_writes = true;

        let result = Migrator::new(&recording, engine()).run(&IterOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(*recording.creates.borrow(), 1);
    }

    #[test]
    fn test_read_error_aborts_before_any_write() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = seed(&store, "a", &[("Editor", json!({ "a": 1 }))]);
        seed(&store, "b", &[("Editor", json!({ "b": 1 }))]);
        let mut recording = Recording::new(&store);
        recording.fail_combined_reads = true;

        let result = Migrator::new(&recording, engine()).run(&IterOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(*recording.creates.borrow(), 0);
        assert_eq!(*recording.updates.borrow(), 0);
        assert!(combined(&store, &account).is_none());
    }
}
