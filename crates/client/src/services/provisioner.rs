//! Workspace provisioning.
//!
//! Every authenticated user ends up with exactly one workspace membership.
//! The first time a user shows up with none, a workspace is created with
//! them as admin, inside a single transaction keyed on their `users/{uid}`
//! record, so a duplicate-tab race can never create two workspaces.

use chrono::Utc;
use domain::models::{ActivityKind, AuthUser, Member, UserRecord, Workspace, WorkspaceRole};
use persistence::repositories::{MemberRepository, UserRepository, WorkspaceRepository};
use persistence::store::MemoryStore;
use uuid::Uuid;

use crate::error::CoreError;
use crate::services::ActivityLog;

/// Ensures authenticated users are linked to a workspace.
#[derive(Clone)]
pub struct WorkspaceProvisioner {
    store: MemoryStore,
    users: UserRepository,
    workspaces: WorkspaceRepository,
    members: MemberRepository,
    activity: ActivityLog,
}

impl WorkspaceProvisioner {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            users: UserRepository::new(store.clone()),
            workspaces: WorkspaceRepository::new(store.clone()),
            members: MemberRepository::new(store.clone()),
            activity: ActivityLog::new(store.clone()),
            store,
        }
    }

    /// Idempotently resolve the user's workspace, creating one on first
    /// sight.
    ///
    /// The read-check-then-write runs as one all-or-nothing transaction
    /// against the user's identity record: either the existing link is
    /// returned, or workspace + admin membership + link appear together.
    /// On a transient conflict the caller may simply retry.
    pub async fn ensure_workspace(&self, user: &AuthUser) -> Result<Uuid, CoreError> {
        let now = Utc::now();
        let users = self.users.clone();
        let workspaces = self.workspaces.clone();
        let members = self.members.clone();
        let tx_user = user.clone();

        let (workspace_id, created) = self
            .store
            .run_transaction(move |tx| {
                let user = tx_user;
                let record = users.get_in_tx(tx, &user.uid)?;
                if let Some(existing) = record.as_ref().and_then(|r| r.workspace_id) {
                    return Ok((existing, false));
                }

                let workspace = Workspace::provisioned_for(&user, now);
                workspaces.create_in_tx(tx, &workspace)?;

                let owner = Member::new(&user, WorkspaceRole::Admin, now);
                members.upsert_in_tx(tx, workspace.id, &owner)?;

                let mut record = record.unwrap_or_else(|| UserRecord::new(&user, now));
                record.email = user.email.clone();
                record.workspace_id = Some(workspace.id);
                record.updated_at = now;
                users.save_in_tx(tx, &record)?;

                Ok((workspace.id, true))
            })
            .await?;

        if created {
            tracing::debug!(%workspace_id, uid = %user.uid, "provisioned workspace");
            self.activity
                .record(workspace_id, user, ActivityKind::Info, "Workspace created")
                .await;
        }
        Ok(workspace_id)
    }

    /// Upsert the `users/{uid}` record without provisioning.
    pub async fn ensure_user_record(&self, user: &AuthUser) -> Result<UserRecord, CoreError> {
        Ok(self.users.ensure_record(user).await?)
    }

    /// One-shot read of the user's active workspace link.
    pub async fn workspace_id_for(&self, uid: &str) -> Result<Option<Uuid>, CoreError> {
        Ok(self.users.workspace_id_for(uid).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser::new("u1", "owner@example.com")
    }

    #[tokio::test]
    async fn test_ensure_workspace_is_idempotent() {
        let store = MemoryStore::new();
        let provisioner = WorkspaceProvisioner::new(store.clone());

        let first = provisioner.ensure_workspace(&user()).await.unwrap();
        let second = provisioner.ensure_workspace(&user()).await.unwrap();
        assert_eq!(first, second);

        let members = MemberRepository::new(store.clone());
        let list = members.list(first).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].role, WorkspaceRole::Admin);
        assert_eq!(list[0].uid, "u1");
    }

    #[tokio::test]
    async fn test_concurrent_provisioning_creates_one_workspace() {
        let store = MemoryStore::new();
        let provisioner = WorkspaceProvisioner::new(store.clone());
        let other = provisioner.clone();

        let u = user();
        let (a, b) = tokio::join!(
            provisioner.ensure_workspace(&u),
            other.ensure_workspace(&u),
        );
        assert_eq!(a.unwrap(), b.unwrap());

        let workspaces = WorkspaceRepository::new(store.clone());
        let wid = UserRepository::new(store)
            .workspace_id_for("u1")
            .await
            .unwrap()
            .unwrap();
        assert!(workspaces.get(wid).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_owner_membership_and_link_appear_together() {
        let store = MemoryStore::new();
        let provisioner = WorkspaceProvisioner::new(store.clone());

        let wid = provisioner.ensure_workspace(&user()).await.unwrap();

        let workspace = WorkspaceRepository::new(store.clone())
            .get(wid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(workspace.owner_uid, "u1");
        assert_eq!(workspace.name, "My Workspace");

        let member = MemberRepository::new(store.clone())
            .get(wid, "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(member.is_admin());

        assert_eq!(
            UserRepository::new(store).workspace_id_for("u1").await.unwrap(),
            Some(wid)
        );
    }

    #[tokio::test]
    async fn test_ensure_user_record_does_not_provision() {
        let provisioner = WorkspaceProvisioner::new(MemoryStore::new());
        let record = provisioner.ensure_user_record(&user()).await.unwrap();
        assert_eq!(record.workspace_id, None);
        assert_eq!(provisioner.workspace_id_for("u1").await.unwrap(), None);
    }
}
