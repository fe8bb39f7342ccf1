//! Storage documents: legacy per-application records and the combined
//! per-account record that replaces them.

use crate::bucket::{Bucket, DataMap};
use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};

/// Legacy storage of one application for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppStorage {
    pub id: ObjectId,
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(default)]
    pub bucket: DataMap,
}

impl AppStorage {
    pub fn new(app_id: impl Into<String>, bucket: DataMap) -> Self {
        Self {
            id: ObjectId::new(),
            app_id: app_id.into(),
            bucket,
        }
    }

    /// Number of top-level keys, used by the size tie-break
    pub fn key_count(&self) -> usize {
        self.bucket.len()
    }
}

/// The single consolidated storage record of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedAppStorage {
    pub id: ObjectId,
    #[serde(rename = "accountId")]
    pub account_id: ObjectId,
    #[serde(default)]
    pub bucket: Bucket,
}

impl CombinedAppStorage {
    /// New record with a freshly generated id
    pub fn new(account_id: ObjectId, bucket: Bucket) -> Self {
        Self {
            id: ObjectId::new(),
            account_id,
            bucket,
        }
    }
}
