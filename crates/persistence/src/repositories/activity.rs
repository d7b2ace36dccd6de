//! Repository for `workspaces/{id}/activity/{id}` documents.
//!
//! Append-only: nothing here updates or deletes entries.

use domain::models::ActivityEntry;
use uuid::Uuid;

use super::{decode, encode};
use crate::store::{paths, MemoryStore, StoreError};

/// Repository for the workspace activity trail.
#[derive(Clone)]
pub struct ActivityRepository {
    store: MemoryStore,
}

impl ActivityRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Append an entry under a fresh id.
    pub async fn append(&self, workspace_id: Uuid, entry: &ActivityEntry) -> Result<(), StoreError> {
        let collection = paths::activity(&workspace_id.to_string());
        let key = Uuid::new_v4().to_string();
        let value = encode(&format!("{collection}/{key}"), entry)?;
        self.store.set(&collection, &key, value).await
    }

    /// Most recent entries, newest first.
    pub async fn recent(
        &self,
        workspace_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StoreError> {
        let collection = paths::activity(&workspace_id.to_string());
        let docs = self.store.list(&collection).await?;
        let mut entries = docs
            .iter()
            .map(|doc| decode::<ActivityEntry>(&collection, doc))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }
}
