//! User domain models.
//!
//! `AuthUser` is what the identity provider hands us; `UserRecord` is the
//! durable `users/{uid}` document that links a user to their active workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user as reported by the identity gateway.
///
/// The `uid` is the provider-issued identifier and is treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
        }
    }

    /// Normalized email used as the invite-inbox key, if any.
    pub fn email_lower(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(shared::validation::normalize_email)
            .filter(|e| !e.is_empty())
    }
}

/// The durable `users/{uid}` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
    /// The user's active workspace, `None` until provisioned.
    pub workspace_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// A fresh, unlinked record for a newly seen user.
    pub fn new(user: &AuthUser, now: DateTime<Utc>) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            workspace_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
