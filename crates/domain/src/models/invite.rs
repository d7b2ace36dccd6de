//! Invite domain models.
//!
//! An invite is written twice under the same id: the canonical
//! `workspaces/{wid}/invites/{id}` record, and the
//! `inviteInbox/{emailLower}/items/{id}` projection. The projection is the
//! only invite-shaped data a not-yet-member is allowed to read, keyed by
//! their own authenticated email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{normalize_email, validate_email_present};
use uuid::Uuid;
use validator::Validate;

use super::user::AuthUser;

/// Status of an invite. Transitions are one-way: pending → accepted or
/// pending → declined, never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InviteStatus::Pending)
    }
}

/// The canonical `workspaces/{wid}/invites/{id}` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    #[serde(skip)]
    pub id: Uuid,
    /// Case-preserved email as typed by the inviter.
    pub email: String,
    /// Normalized delivery key.
    pub email_lower: String,
    pub status: InviteStatus,
    pub workspace_id: Uuid,
    pub invited_by_uid: String,
    pub invited_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined_by_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined_by_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined_at: Option<DateTime<Utc>>,
}

impl Invite {
    /// A fresh pending invite from `inviter` to `email` for `workspace_id`.
    ///
    /// `email` should already be validated as non-empty after normalization.
    pub fn new(workspace_id: Uuid, inviter: &AuthUser, email: &str, now: DateTime<Utc>) -> Self {
        let email_clean = email.trim().to_string();
        Self {
            id: Uuid::new_v4(),
            email_lower: normalize_email(&email_clean),
            email: email_clean,
            status: InviteStatus::Pending,
            workspace_id,
            invited_by_uid: inviter.uid.clone(),
            invited_by_email: inviter.email.clone(),
            created_at: now,
            accepted_by_uid: None,
            accepted_by_email: None,
            accepted_at: None,
            declined_by_uid: None,
            declined_by_email: None,
            declined_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }

    /// The inbox projection sharing this invite's id.
    pub fn inbox_projection(&self) -> InboxInvite {
        InboxInvite {
            invite_id: self.id,
            workspace_id: self.workspace_id,
            status: self.status,
            invited_by_uid: self.invited_by_uid.clone(),
            invited_by_email: self.invited_by_email.clone(),
            email: self.email.clone(),
            email_lower: self.email_lower.clone(),
            created_at: self.created_at,
        }
    }
}

/// The `inviteInbox/{emailLower}/items/{id}` projection document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxInvite {
    pub invite_id: Uuid,
    pub workspace_id: Uuid,
    pub status: InviteStatus,
    pub invited_by_uid: String,
    pub invited_by_email: Option<String>,
    pub email: String,
    pub email_lower: String,
    pub created_at: DateTime<Utc>,
}

impl InboxInvite {
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }
}

/// Request to invite a teammate by email.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    #[validate(custom(function = "validate_email_present"))]
    pub email: String,
}
