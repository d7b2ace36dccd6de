//! Repository for `workspaces/{id}` documents.

use domain::models::Workspace;
use uuid::Uuid;

use super::{decode, encode};
use crate::store::{paths, Document, MemoryStore, StoreError, Subscription, Tx};

/// Repository for workspace documents.
#[derive(Clone)]
pub struct WorkspaceRepository {
    store: MemoryStore,
}

impl WorkspaceRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        let collection = paths::workspaces();
        let key = id.to_string();
        match self.store.get(&collection, &key).await? {
            Some(data) => {
                let doc = Document { id: key, data };
                let mut workspace: Workspace = decode(&collection, &doc)?;
                workspace.id = id;
                Ok(Some(workspace))
            }
            None => Ok(None),
        }
    }

    /// Live watcher over one workspace document, mirroring the backend's
    /// per-document listener. A collection-wide watch would be rejected by
    /// the backend's rules.
    pub async fn subscribe(&self, id: Uuid) -> Subscription {
        self.store
            .subscribe_doc(&paths::workspaces(), &id.to_string())
            .await
    }

    /// Transactional create, staged under the workspace's id.
    pub fn create_in_tx(&self, tx: &mut Tx<'_>, workspace: &Workspace) -> Result<(), StoreError> {
        let collection = paths::workspaces();
        let key = workspace.id.to_string();
        let value = encode(&format!("{collection}/{key}"), workspace)?;
        tx.set(&collection, &key, value);
        Ok(())
    }
}
