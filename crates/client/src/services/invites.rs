//! Invite ledger: creation, inbox delivery, accept/decline.
//!
//! Each invite is written twice under one id: the canonical workspace
//! record and the per-email inbox projection. The projection is what a
//! not-yet-member can read, so realtime delivery works before any
//! workspace access exists. Resolution deletes the projection and marks
//! the canonical record best-effort; membership creation always wins over
//! bookkeeping.

use chrono::Utc;
use domain::models::{
    ActivityKind, AuthUser, InboxInvite, Invite, InviteMemberRequest, Member, WorkspaceRole,
};
use persistence::repositories::{InboxRepository, InviteRepository, MemberRepository, UserRepository};
use persistence::store::MemoryStore;
use shared::validation::normalize_email;
use uuid::Uuid;
use validator::Validate;

use crate::error::CoreError;
use crate::services::sync::{self, TypedFeed};
use crate::services::ActivityLog;

/// Records invites and drives their lifecycle.
#[derive(Clone)]
pub struct InviteLedger {
    invites: InviteRepository,
    inbox: InboxRepository,
    members: MemberRepository,
    users: UserRepository,
    activity: ActivityLog,
}

impl InviteLedger {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            invites: InviteRepository::new(store.clone()),
            inbox: InboxRepository::new(store.clone()),
            members: MemberRepository::new(store.clone()),
            users: UserRepository::new(store.clone()),
            activity: ActivityLog::new(store),
        }
    }

    /// Invite `request.email` to `workspace_id` on behalf of `inviter`.
    ///
    /// Requires the inviter to hold the admin role. Writes the canonical
    /// record first, then the inbox projection under the same id.
    pub async fn invite(
        &self,
        workspace_id: Uuid,
        inviter: &AuthUser,
        request: InviteMemberRequest,
    ) -> Result<Uuid, CoreError> {
        request.validate()?;
        self.require_admin(workspace_id, inviter).await?;

        let invite = Invite::new(workspace_id, inviter, &request.email, Utc::now());
        self.invites.create(&invite).await?;
        self.inbox.put(&invite.inbox_projection()).await?;

        self.activity
            .record(
                workspace_id,
                inviter,
                ActivityKind::Member,
                format!("Invited {}", invite.email),
            )
            .await;
        Ok(invite.id)
    }

    /// One-shot inbox read for a (raw) email.
    pub async fn list_inbox(&self, email: &str) -> Result<Vec<InboxInvite>, CoreError> {
        Ok(self.inbox.list(&normalize_email(email)).await?)
    }

    /// First pending invite for an email, if any. Used at registration.
    pub async fn find_pending_invite(&self, email: &str) -> Result<Option<InboxInvite>, CoreError> {
        Ok(self
            .list_inbox(email)
            .await?
            .into_iter()
            .find(|i| i.is_pending()))
    }

    /// Realtime inbox feed, keyed only on the email. Survives workspace
    /// switches; the caller filters to pending and applies display policy.
    pub async fn subscribe_inbox(&self, email: &str) -> TypedFeed<Vec<InboxInvite>> {
        let sub = self.inbox.subscribe(&normalize_email(email)).await;
        sync::inbox_feed(sub)
    }

    /// Accept an invite: link the user to the workspace, create the
    /// membership, then clean up the invite records.
    ///
    /// Idempotent on retry: the membership write is an upsert keyed on
    /// (workspace, uid). Marking the canonical invite is best-effort; the
    /// invitee's access never rolls back because bookkeeping failed.
    pub async fn accept(&self, user: &AuthUser, invite: &InboxInvite) -> Result<Uuid, CoreError> {
        let workspace_id = invite.workspace_id;

        self.users.link_workspace(user, workspace_id).await?;

        let member = Member::new(user, WorkspaceRole::Member, Utc::now());
        self.members.upsert(workspace_id, &member).await?;

        if let Err(err) = self
            .invites
            .mark_accepted(workspace_id, invite.invite_id, user, Utc::now())
            .await
        {
            tracing::warn!(invite_id = %invite.invite_id, error = %err, "failed to mark invite accepted");
        }

        // Remove the projection so realtime listeners drop it immediately.
        self.inbox
            .delete(&invite.email_lower, invite.invite_id)
            .await?;

        self.activity
            .record(
                workspace_id,
                user,
                ActivityKind::Member,
                format!(
                    "{} joined the workspace",
                    user.email.as_deref().unwrap_or(&user.uid)
                ),
            )
            .await;
        Ok(workspace_id)
    }

    /// Decline an invite. No membership side effect.
    pub async fn decline(&self, user: &AuthUser, invite: &InboxInvite) -> Result<(), CoreError> {
        if let Err(err) = self
            .invites
            .mark_declined(invite.workspace_id, invite.invite_id, user, Utc::now())
            .await
        {
            tracing::warn!(invite_id = %invite.invite_id, error = %err, "failed to mark invite declined");
        }

        self.inbox
            .delete(&invite.email_lower, invite.invite_id)
            .await?;
        Ok(())
    }

    /// All invites for a workspace, newest first. Admin audit view.
    pub async fn list_for_workspace(&self, workspace_id: Uuid) -> Result<Vec<Invite>, CoreError> {
        Ok(self.invites.list(workspace_id).await?)
    }

    async fn require_admin(&self, workspace_id: Uuid, actor: &AuthUser) -> Result<(), CoreError> {
        let member = self
            .members
            .get(workspace_id, &actor.uid)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("membership for {}", actor.uid)))?;
        if !member.role.can_manage_members() {
            return Err(CoreError::Authorization(
                "Only workspace admins can invite members".into(),
            ));
        }
        Ok(())
    }
}
