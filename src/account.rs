//! Account documents (read-only source collection)

use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};

/// A user account. The migrator never writes accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: ObjectId,
    /// Public nickname, used in log lines
    pub nickname: String,
}

impl Account {
    pub fn new(id: ObjectId, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
        }
    }
}

/// Selector applied by the iterator to the accounts collection.
///
/// An empty filter matches every account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    /// Restrict to these account ids
    pub ids: Vec<ObjectId>,
}

impl AccountFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_ids(ids: impl IntoIterator<Item = ObjectId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
