//! Repository for `workspaces/{id}/members/{uid}` documents.

use domain::models::Member;
use uuid::Uuid;

use super::{decode, encode};
use crate::store::{paths, Document, MemoryStore, StoreError, Subscription, Tx};

/// Repository for workspace membership records.
#[derive(Clone)]
pub struct MemberRepository {
    store: MemoryStore,
}

impl MemberRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub async fn get(&self, workspace_id: Uuid, uid: &str) -> Result<Option<Member>, StoreError> {
        let collection = paths::members(&workspace_id.to_string());
        match self.store.get(&collection, uid).await? {
            Some(data) => {
                let doc = Document {
                    id: uid.to_string(),
                    data,
                };
                decode(&collection, &doc).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Upsert a membership keyed on (workspace, uid). Re-running an accept
    /// after a partial failure lands on the same document.
    pub async fn upsert(&self, workspace_id: Uuid, member: &Member) -> Result<(), StoreError> {
        let collection = paths::members(&workspace_id.to_string());
        let value = encode(&format!("{collection}/{}", member.uid), member)?;
        self.store.set(&collection, &member.uid, value).await
    }

    /// All members of a workspace, oldest joiner first.
    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Member>, StoreError> {
        let collection = paths::members(&workspace_id.to_string());
        let docs = self.store.list(&collection).await?;
        let mut members = docs
            .iter()
            .map(|doc| decode::<Member>(&collection, doc))
            .collect::<Result<Vec<_>, _>>()?;
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    pub async fn subscribe(&self, workspace_id: Uuid) -> Subscription {
        self.store
            .subscribe(&paths::members(&workspace_id.to_string()))
            .await
    }

    /// Transactional upsert, used when provisioning the owner membership.
    pub fn upsert_in_tx(
        &self,
        tx: &mut Tx<'_>,
        workspace_id: Uuid,
        member: &Member,
    ) -> Result<(), StoreError> {
        let collection = paths::members(&workspace_id.to_string());
        let value = encode(&format!("{collection}/{}", member.uid), member)?;
        tx.set(&collection, &member.uid, value);
        Ok(())
    }
}
