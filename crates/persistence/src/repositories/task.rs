//! Repository for `workspaces/{id}/tasks/{id}` documents.

use domain::models::Task;
use uuid::Uuid;

use super::{bad_doc_id, decode, encode};
use crate::store::{paths, Document, MemoryStore, StoreError, Subscription};

/// Repository for task documents.
#[derive(Clone)]
pub struct TaskRepository {
    store: MemoryStore,
}

impl TaskRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Upsert the full task document.
    pub async fn save(&self, workspace_id: Uuid, task: &Task) -> Result<(), StoreError> {
        let collection = paths::tasks(&workspace_id.to_string());
        let key = task.id.to_string();
        let value = encode(&format!("{collection}/{key}"), task)?;
        self.store.set(&collection, &key, value).await
    }

    pub async fn get(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        let collection = paths::tasks(&workspace_id.to_string());
        let key = id.to_string();
        match self.store.get(&collection, &key).await? {
            Some(data) => {
                let doc = Document { id: key, data };
                let mut task: Task = decode(&collection, &doc)?;
                task.id = id;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Hard removal; only valid for already-trashed tasks, enforced upstream.
    pub async fn delete(&self, workspace_id: Uuid, id: Uuid) -> Result<(), StoreError> {
        self.store
            .delete(&paths::tasks(&workspace_id.to_string()), &id.to_string())
            .await
    }

    /// Active tasks (not trashed), most recently updated first.
    pub async fn list_active(&self, workspace_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .list_all(workspace_id)
            .await?
            .into_iter()
            .filter(|t| !t.is_deleted)
            .collect())
    }

    /// Trashed tasks, most recently updated first.
    pub async fn list_trashed(&self, workspace_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .list_all(workspace_id)
            .await?
            .into_iter()
            .filter(|t| t.is_deleted)
            .collect())
    }

    pub async fn subscribe(&self, workspace_id: Uuid) -> Subscription {
        self.store
            .subscribe(&paths::tasks(&workspace_id.to_string()))
            .await
    }

    async fn list_all(&self, workspace_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let collection = paths::tasks(&workspace_id.to_string());
        let docs = self.store.list(&collection).await?;
        let mut tasks = docs
            .iter()
            .map(|doc| {
                let mut task: Task = decode(&collection, doc)?;
                task.id = doc
                    .id
                    .parse()
                    .map_err(|_| bad_doc_id(&collection, &doc.id))?;
                Ok(task)
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(tasks)
    }
}
