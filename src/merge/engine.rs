use crate::app_storage::{AppStorage, CombinedAppStorage};
use crate::bucket::{AppData, Bucket};
use crate::object_id::ObjectId;
use crate::storage::Lookup;
use super::Denylist;

/// What to write for one account
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    /// No record existed; insert this one
    Create(CombinedAppStorage),
    /// Replace the existing record with this one
    Update(CombinedAppStorage),
}

impl MergeDecision {
    pub fn record(&self) -> &CombinedAppStorage {
        match self {
            MergeDecision::Create(doc) | MergeDecision::Update(doc) => doc,
        }
    }

    pub fn into_record(self) -> CombinedAppStorage {
        match self {
            MergeDecision::Create(doc) | MergeDecision::Update(doc) => doc,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, MergeDecision::Create(_))
    }
}

/// Combines legacy app storages into combined records.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    denylist: Denylist,
}

impl MergeEngine {
    pub fn new(denylist: Denylist) -> Self {
        Self { denylist }
    }

    /// Stage A: one entry per app id.
    ///
    /// When an app id repeats, the storage with more keys wins. On a tie the
    /// later storage replaces the earlier one.
    pub fn aggregate<I>(&self, storages: I) -> Bucket
    where
        I: IntoIterator<Item = AppStorage>,
    {
        let mut bucket = Bucket::new();

        for storage in storages {
            match bucket.get_mut(&storage.app_id) {
                Some(current) if current.key_count() > storage.key_count() => {
                    tracing::info!(
                        "Skipping app storage {} for {}: {} keys, kept {}",
                        storage.id,
                        storage.app_id,
                        storage.key_count(),
                        current.key_count()
                    );
                }
                Some(current) => {
                    tracing::info!(
                        "Replacing {} keys of {} with app storage {} ({} keys)",
                        current.key_count(),
                        storage.app_id,
                        storage.id,
                        storage.key_count()
                    );
                    current.data = storage.bucket;
                }
                None => {
                    bucket.insert(storage.app_id, AppData::new(storage.bucket));
                }
            }
        }

        bucket
    }

    /// Stages B and C: fold `fresh` into the account's record.
    ///
    /// A missing record becomes a new one. An existing record only gains
    /// app ids and keys it does not have yet.
    pub fn reconcile(
        &self,
        account_id: ObjectId,
        existing: Lookup<CombinedAppStorage>,
        fresh: Bucket,
    ) -> MergeDecision {
        match existing {
            Lookup::NotFound => {
                let mut doc = CombinedAppStorage::new(account_id, fresh);
                self.strip_denylisted(&mut doc.bucket);
                MergeDecision::Create(doc)
            }
            Lookup::Found(mut doc) => {
                merge_into(&mut doc.bucket, fresh);
                self.strip_denylisted(&mut doc.bucket);
                MergeDecision::Update(doc)
            }
        }
    }

    /// Stage C: drop denylisted app ids, returning how many were removed
    pub fn strip_denylisted(&self, bucket: &mut Bucket) -> usize {
        if self.denylist.is_empty() {
            return 0;
        }
        let before = bucket.len();
        bucket.retain(|app_id, _| !self.denylist.contains(app_id));
        let removed = before - bucket.len();
        if removed > 0 {
            tracing::debug!("Removed {} denylisted apps", removed);
        }
        removed
    }
}

/// First write wins: existing app ids and keys are never overwritten
fn merge_into(target: &mut Bucket, fresh: Bucket) {
    for (app_id, incoming) in fresh {
        match target.get_mut(&app_id) {
            None => {
                target.insert(app_id, incoming);
            }
            Some(current) => {
                for (key, value) in incoming.data {
                    if !current.data.contains_key(&key) {
                        tracing::debug!("Adding key {} to {}", key, app_id);
                        current.data.insert(key, value);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn storage(app_id: &str, data: serde_json::Value) -> AppStorage {
        AppStorage::new(app_id, serde_json::from_value(data).unwrap())
    }

    fn bucket(value: serde_json::Value) -> Bucket {
        serde_json::from_value(value).unwrap()
    }

    fn engine() -> MergeEngine {
        MergeEngine::new(Denylist::builtin())
    }

    #[test]
    fn test_larger_storage_wins_regardless_of_order() {
        let small = storage("Editor", json!({ "a": 1, "b": 2, "c": 3 }));
        let large = storage("Editor", json!({ "a": 9, "b": 8, "c": 7, "d": 6, "e": 5 }));

        for order in [vec![small.clone(), large.clone()], vec![large.clone(), small.clone()]] {
            let merged = engine().aggregate(order);
            assert_eq!(merged.len(), 1);
            assert_eq!(merged.get("Editor").unwrap().data, large.bucket);
        }
    }

    #[test]
    fn test_equal_size_later_storage_wins() {
        let first = storage("Editor", json!({ "a": 1 }));
        let second = storage("Editor", json!({ "b": 2 }));
        let merged = engine().aggregate(vec![first, second.clone()]);
        assert_eq!(merged.get("Editor").unwrap().data, second.bucket);
    }

    #[test]
    fn test_distinct_apps_are_all_kept() {
        let merged = engine().aggregate(vec![
            storage("Editor", json!({ "theme": "dark" })),
            storage("Terminal", json!({})),
        ]);
        assert_eq!(merged.app_ids().collect::<Vec<_>>(), vec!["Editor", "Terminal"]);
    }

    #[test]
    fn test_create_strips_denylisted() {
        let account = ObjectId::new();
        let fresh = bucket(json!({
            "Editor": { "data": { "k": 1 } },
            "Dashboard": { "data": { "k": 2 } }
        }));

        let decision = engine().reconcile(account, Lookup::NotFound, fresh);
        assert!(decision.is_create());
        let doc = decision.record();
        assert_eq!(doc.account_id, account);
        assert_eq!(doc.bucket, bucket(json!({ "Editor": { "data": { "k": 1 } } })));
    }

    #[test]
    fn test_existing_keys_are_never_overwritten() {
        let account = ObjectId::new();
        let existing = CombinedAppStorage::new(account, bucket(json!({ "App": { "data": { "k1": "old" } } })));
        let id = existing.id;
        let fresh = bucket(json!({
            "App": { "data": { "k1": "new", "k2": "v2" } },
            "Other": { "data": { "x": true } }
        }));

        let decision = engine().reconcile(account, Lookup::Found(existing), fresh);
        assert!(!decision.is_create());
        let doc = decision.into_record();
        assert_eq!(doc.id, id);
        assert_eq!(
            doc.bucket,
            bucket(json!({
                "App": { "data": { "k1": "old", "k2": "v2" } },
                "Other": { "data": { "x": true } }
            }))
        );
    }

    #[test]
    fn test_update_strips_denylisted_already_present() {
        let account = ObjectId::new();
        let existing = CombinedAppStorage::new(
            account,
            bucket(json!({ "Home": { "data": { "a": 1 } }, "Editor": { "data": {} } })),
        );
        let fresh = bucket(json!({ "Login": { "data": { "b": 2 } } }));

        let doc = engine().reconcile(account, Lookup::Found(existing), fresh).into_record();
        assert_eq!(doc.bucket, bucket(json!({ "Editor": { "data": {} } })));
    }

    #[test]
    fn test_denylisted_only_creates_empty_record() {
        let account = ObjectId::new();
        let fresh = engine().aggregate(vec![storage("Activity", json!({ "seen": 1 }))]);

        let decision = engine().reconcile(account, Lookup::NotFound, fresh);
        assert!(decision.is_create());
        assert!(decision.record().bucket.is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let account = ObjectId::new();
        let storages = vec![
            storage("Editor", json!({ "a": 1, "b": [1, 2] })),
            storage("Terminal", json!({ "font": { "size": 12 } })),
            storage("Apps", json!({ "x": 1 })),
        ];

        let once = engine()
            .reconcile(account, Lookup::NotFound, engine().aggregate(storages.clone()))
            .into_record();
        let twice = engine()
            .reconcile(account, Lookup::Found(once.clone()), engine().aggregate(storages))
            .into_record();

        assert_eq!(twice, once);
    }

    #[test]
    fn test_empty_denylist_keeps_everything() {
        let engine = MergeEngine::new(Denylist::empty());
        let mut b = bucket(json!({ "Activity": { "data": {} } }));
        assert_eq!(engine.strip_denylisted(&mut b), 0);
        assert!(b.contains("Activity"));
    }
}
