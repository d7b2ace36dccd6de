//! Workspace domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::AuthUser;

/// Name given to a workspace provisioned on first login.
pub const DEFAULT_WORKSPACE_NAME: &str = "My Workspace";

/// The `workspaces/{id}` document. The id is the document's path segment,
/// not a stored field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(skip)]
    pub id: Uuid,
    pub name: String,
    pub owner_uid: String,
    pub owner_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// A new workspace owned by `user`, using the default name.
    pub fn provisioned_for(user: &AuthUser, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_WORKSPACE_NAME.to_string(),
            owner_uid: user.uid.clone(),
            owner_email: user.email.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
