//! Bucket types - the nested key/value payload stored per application
//!
//! Shape on disk: `{ appId: { "data": { key: value, ... } } }`.
//! Values are opaque JSON and are never reinterpreted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw key/value map of one application
pub type DataMap = BTreeMap<String, Value>;

/// Storage of a single application inside a combined record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub data: DataMap,
}

impl AppData {
    pub fn new(data: DataMap) -> Self {
        Self { data }
    }

    /// Number of keys, compared by the size tie-break
    pub fn key_count(&self) -> usize {
        self.data.len()
    }
}

/// Combined bucket keyed by application id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket(BTreeMap<String, AppData>);

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, app_id: &str) -> Option<&AppData> {
        self.0.get(app_id)
    }

    pub fn get_mut(&mut self, app_id: &str) -> Option<&mut AppData> {
        self.0.get_mut(app_id)
    }

    pub fn insert(&mut self, app_id: impl Into<String>, data: AppData) -> Option<AppData> {
        self.0.insert(app_id.into(), data)
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.0.contains_key(app_id)
    }

    pub fn retain(&mut self, keep: impl FnMut(&String, &mut AppData) -> bool) {
        self.0.retain(keep)
    }

    pub fn app_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Bucket {
    type Item = (String, AppData);
    type IntoIter = std::collections::btree_map::IntoIter<String, AppData>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
