//! Workspace membership domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::AuthUser;

/// Role of a member within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Admin,
    Member,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Admin => "admin",
            WorkspaceRole::Member => "member",
        }
    }

    /// Returns true if this role can invite teammates and assign tasks.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, WorkspaceRole::Admin)
    }
}

/// The `workspaces/{id}/members/{uid}` document.
///
/// Unique per (workspace, uid); the first member of a workspace is always
/// the admin owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub uid: String,
    pub email: Option<String>,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(user: &AuthUser, role: WorkspaceRole, now: DateTime<Utc>) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            role,
            joined_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == WorkspaceRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Admin).unwrap(),
            "\"admin\""
        );
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Member).unwrap(),
            "\"member\""
        );
    }

    #[test]
    fn test_role_permissions() {
        assert!(WorkspaceRole::Admin.can_manage_members());
        assert!(!WorkspaceRole::Member.can_manage_members());
    }

    #[test]
    fn test_member_field_names() {
        let user = AuthUser::new("u1", "a@b.com");
        let member = Member::new(&user, WorkspaceRole::Member, Utc::now());
        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("joinedAt").is_some());
        assert_eq!(json["role"], "member");
        assert!(!member.is_admin());
    }
}
