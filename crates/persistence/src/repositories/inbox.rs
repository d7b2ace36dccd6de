//! Repository for `inviteInbox/{emailLower}/items/{id}` projections.
//!
//! The inbox is keyed by normalized email so a not-yet-member can read
//! their own pending invites without any workspace access.

use domain::models::InboxInvite;
use uuid::Uuid;

use super::{decode, encode};
use crate::store::{paths, MemoryStore, StoreError, Subscription};

/// Repository for the per-email invite inbox.
#[derive(Clone)]
pub struct InboxRepository {
    store: MemoryStore,
}

impl InboxRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Write an inbox item under the canonical invite's id.
    pub async fn put(&self, item: &InboxInvite) -> Result<(), StoreError> {
        let collection = paths::inbox(&item.email_lower);
        let key = item.invite_id.to_string();
        let value = encode(&format!("{collection}/{key}"), item)?;
        self.store.set(&collection, &key, value).await
    }

    /// One-shot read of the inbox, oldest invite first.
    pub async fn list(&self, email_lower: &str) -> Result<Vec<InboxInvite>, StoreError> {
        let collection = paths::inbox(email_lower);
        let docs = self.store.list(&collection).await?;
        let mut items = docs
            .iter()
            .map(|doc| decode::<InboxInvite>(&collection, doc))
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    /// Remove the projection once the invite is resolved, so realtime
    /// listeners stop showing it immediately. Missing items are fine.
    pub async fn delete(&self, email_lower: &str, invite_id: Uuid) -> Result<(), StoreError> {
        self.store
            .delete(&paths::inbox(email_lower), &invite_id.to_string())
            .await
    }

    /// Live watcher keyed only on the email; survives workspace switches.
    pub async fn subscribe(&self, email_lower: &str) -> Subscription {
        self.store.subscribe(&paths::inbox(email_lower)).await
    }
}
