//! Relationship resolution and storage fetching
//!
//! Turns an account id into the legacy storage documents linked to it:
//! 1. Find `Account --appStorage--> AppStorage` edges
//! 2. Drop edges whose target id is malformed
//! 3. Fetch the storage documents that still exist

use crate::Result;
use crate::app_storage::AppStorage;
use crate::object_id::ObjectId;
use crate::relationship::RelationshipFilter;
use crate::storage::MigrationStore;

/// Target ids found for one account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTargets {
    /// Number of matching edges, valid or not
    pub edges: usize,
    /// Valid target ids in edge order
    pub ids: Vec<ObjectId>,
}

impl ResolvedTargets {
    pub fn has_edges(&self) -> bool {
        self.edges > 0
    }

    pub fn invalid(&self) -> usize {
        self.edges - self.ids.len()
    }
}

/// Look up the app storage ids linked to an account
pub fn resolve_app_storage_ids<S>(store: &S, account_id: ObjectId) -> Result<ResolvedTargets>
where
    S: MigrationStore + ?Sized,
{
    let rels = store.find_relationships(&RelationshipFilter::app_storages_of(account_id))?;

    let mut ids = Vec::with_capacity(rels.len());
    for rel in &rels {
        match rel.valid_target_id() {
            Some(id) => ids.push(id),
            None => tracing::warn!(
                "Relationship {} has invalid target id {:?}",
                rel.id,
                rel.target_id
            ),
        }
    }

    Ok(ResolvedTargets { edges: rels.len(), ids })
}

/// Fetch the existing app storages for `ids`.
///
/// Deleted documents are silently absent from the result.
pub fn fetch_app_storages<S>(store: &S, ids: &[ObjectId]) -> Result<Vec<AppStorage>>
where
    S: MigrationStore + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let storages = store.app_storages_by_ids(ids)?;
    if storages.len() < ids.len() {
        tracing::debug!("Fetched {} of {} app storages", storages.len(), ids.len());
    }
    Ok(storages)
}
