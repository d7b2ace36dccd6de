//! Activity log domain model.
//!
//! Entries are append-only; nothing in the system updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::AuthUser;

/// Category of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Task,
    Trash,
    Member,
    Info,
}

/// The `workspaces/{wid}/activity/{id}` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub actor_uid: Option<String>,
    pub actor_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        actor: &AuthUser,
        kind: ActivityKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            actor_uid: Some(actor.uid.clone()),
            actor_email: actor.email.clone(),
            created_at: now,
        }
    }
}
