//! Relationship records - directed links between documents
//!
//! A relationship is an edge `source --as--> target`. The migrator only
//! follows `Account --appStorage--> AppStorage` edges.

use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};

/// Source name of edges owned by an account
pub const ACCOUNT: &str = "Account";
/// Target name of edges pointing at legacy storage documents
pub const APP_STORAGE: &str = "AppStorage";
/// Role of account → storage edges
pub const APP_STORAGE_ROLE: &str = "appStorage";

/// An edge between two documents.
///
/// `target_id` is kept as the raw stored string: legacy edges may carry
/// malformed ids, and callers decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub id: ObjectId,
    #[serde(rename = "sourceName")]
    pub source_name: String,
    #[serde(rename = "targetName")]
    pub target_name: String,
    #[serde(rename = "sourceId")]
    pub source_id: ObjectId,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "as")]
    pub role: String,
}

impl Relationship {
    /// Create an `Account --appStorage--> AppStorage` edge
    pub fn app_storage(account_id: ObjectId, target_id: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            source_name: ACCOUNT.to_string(),
            target_name: APP_STORAGE.to_string(),
            source_id: account_id,
            target_id: target_id.into(),
            role: APP_STORAGE_ROLE.to_string(),
        }
    }

    /// Parsed target id, `None` when the stored value is malformed
    pub fn valid_target_id(&self) -> Option<ObjectId> {
        ObjectId::parse(&self.target_id).ok()
    }
}

/// Exact-match selector over relationship fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipFilter {
    pub source_name: String,
    pub target_name: String,
    pub source_id: ObjectId,
    pub role: String,
}

impl RelationshipFilter {
    /// Edges from an account to its legacy storage documents
    pub fn app_storages_of(account_id: ObjectId) -> Self {
        Self {
            source_name: ACCOUNT.to_string(),
            target_name: APP_STORAGE.to_string(),
            source_id: account_id,
            role: APP_STORAGE_ROLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_storage_edge_matches_filter_fields() {
        let account = ObjectId::new();
        let filter = RelationshipFilter::app_storages_of(account);
        let edge = Relationship::app_storage(account, ObjectId::new().to_hex());

        assert_eq!(edge.source_name, filter.source_name);
        assert_eq!(edge.target_name, filter.target_name);
        assert_eq!(edge.source_id, filter.source_id);
        assert_eq!(edge.role, filter.role);
    }

    #[test]
    fn test_valid_target_id() {
        let account = ObjectId::new();
        let target = ObjectId::new();
        assert_eq!(
            Relationship::app_storage(account, target.to_hex()).valid_target_id(),
            Some(target)
        );
        assert_eq!(Relationship::app_storage(account, "").valid_target_id(), None);
    }

    #[test]
    fn test_serde_field_names() {
        let edge = Relationship::app_storage(ObjectId::new(), "bogus");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["sourceName"], "Account");
        assert_eq!(json["targetName"], "AppStorage");
        assert_eq!(json["as"], "appStorage");
        assert_eq!(json["targetId"], "bogus");
    }
}
