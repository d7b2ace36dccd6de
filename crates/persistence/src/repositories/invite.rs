//! Repository for canonical `workspaces/{id}/invites/{id}` documents.

use chrono::{DateTime, Utc};
use domain::models::{AuthUser, Invite, InviteStatus};
use uuid::Uuid;

use super::{bad_doc_id, decode, encode};
use crate::store::{paths, Document, MemoryStore, StoreError};

/// Repository for the workspace-scoped invite audit records.
#[derive(Clone)]
pub struct InviteRepository {
    store: MemoryStore,
}

impl InviteRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, invite: &Invite) -> Result<(), StoreError> {
        let collection = paths::invites(&invite.workspace_id.to_string());
        let key = invite.id.to_string();
        let value = encode(&format!("{collection}/{key}"), invite)?;
        self.store.set(&collection, &key, value).await
    }

    pub async fn get(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<Invite>, StoreError> {
        let collection = paths::invites(&workspace_id.to_string());
        let key = id.to_string();
        match self.store.get(&collection, &key).await? {
            Some(data) => {
                let doc = Document { id: key, data };
                let mut invite: Invite = decode(&collection, &doc)?;
                invite.id = id;
                Ok(Some(invite))
            }
            None => Ok(None),
        }
    }

    /// All invites for a workspace, newest first.
    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Invite>, StoreError> {
        let collection = paths::invites(&workspace_id.to_string());
        let docs = self.store.list(&collection).await?;
        let mut invites = docs
            .iter()
            .map(|doc| {
                let mut invite: Invite = decode(&collection, doc)?;
                invite.id = doc
                    .id
                    .parse()
                    .map_err(|_| bad_doc_id(&collection, &doc.id))?;
                Ok(invite)
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    /// Mark the canonical record accepted, recording who and when.
    pub async fn mark_accepted(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        user: &AuthUser,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut invite = self
            .get(workspace_id, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("invite {id} in workspace {workspace_id}")))?;
        invite.status = InviteStatus::Accepted;
        invite.accepted_by_uid = Some(user.uid.clone());
        invite.accepted_by_email = user.email.clone();
        invite.accepted_at = Some(now);
        self.create(&invite).await
    }

    /// Mark the canonical record declined, recording who and when.
    pub async fn mark_declined(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        user: &AuthUser,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut invite = self
            .get(workspace_id, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("invite {id} in workspace {workspace_id}")))?;
        invite.status = InviteStatus::Declined;
        invite.declined_by_uid = Some(user.uid.clone());
        invite.declined_by_email = user.email.clone();
        invite.declined_at = Some(now);
        self.create(&invite).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AuthUser {
        AuthUser::new("admin-1", "admin@example.com")
    }

    #[tokio::test]
    async fn test_create_get_roundtrip() {
        let repo = InviteRepository::new(MemoryStore::new());
        let invite = Invite::new(Uuid::new_v4(), &admin(), "bob@example.com", Utc::now());
        repo.create(&invite).await.unwrap();

        let loaded = repo
            .get(invite.workspace_id, invite.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, invite.id);
        assert_eq!(loaded.email_lower, "bob@example.com");
        assert!(loaded.is_pending());
    }

    #[tokio::test]
    async fn test_mark_accepted_records_attribution() {
        let repo = InviteRepository::new(MemoryStore::new());
        let invite = Invite::new(Uuid::new_v4(), &admin(), "bob@example.com", Utc::now());
        repo.create(&invite).await.unwrap();

        let bob = AuthUser::new("bob-1", "bob@example.com");
        repo.mark_accepted(invite.workspace_id, invite.id, &bob, Utc::now())
            .await
            .unwrap();

        let loaded = repo
            .get(invite.workspace_id, invite.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.status, InviteStatus::Accepted);
        assert_eq!(loaded.accepted_by_uid.as_deref(), Some("bob-1"));
        assert!(loaded.accepted_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_declined_missing_invite() {
        let repo = InviteRepository::new(MemoryStore::new());
        let bob = AuthUser::new("bob-1", "bob@example.com");
        let result = repo
            .mark_declined(Uuid::new_v4(), Uuid::new_v4(), &bob, Utc::now())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_reports_malformed_id_as_corrupt() {
        let store = MemoryStore::new();
        let repo = InviteRepository::new(store.clone());
        let wid = Uuid::new_v4();
        let invite = Invite::new(wid, &admin(), "bob@example.com", Utc::now());

        // A document keyed by something that is not a uuid.
        let collection = paths::invites(&wid.to_string());
        let body = serde_json::to_value(&invite).unwrap();
        store.set(&collection, "not-a-uuid", body).await.unwrap();

        let result = repo.list(wid).await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = InviteRepository::new(MemoryStore::new());
        let wid = Uuid::new_v4();
        let older = Invite::new(wid, &admin(), "a@example.com", Utc::now() - chrono::Duration::hours(1));
        let newer = Invite::new(wid, &admin(), "b@example.com", Utc::now());
        repo.create(&older).await.unwrap();
        repo.create(&newer).await.unwrap();

        let invites = repo.list(wid).await.unwrap();
        assert_eq!(invites[0].email, "b@example.com");
        assert_eq!(invites[1].email, "a@example.com");
    }
}
