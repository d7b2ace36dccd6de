//! Task domain models and task policy.
//!
//! Tasks move freely among `todo`/`doing`/`done`, but only when moved by
//! their current assignee. Assignee matching treats the uid as
//! authoritative; the email fallback exists only for records created before
//! uid-based assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_task_title;
use uuid::Uuid;
use validator::Validate;

use super::member::WorkspaceRole;
use super::user::AuthUser;

/// Lifecycle column of a task board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

/// The `workspaces/{wid}/tasks/{id}` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_uid: Option<String>,
    pub assignee_email: Option<String>,
    pub created_by_uid: String,
    pub created_by_email: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether `user` is the current assignee.
    ///
    /// The uid is authoritative when present on the record; the email match
    /// only applies to legacy records that carry no assignee uid.
    pub fn is_assigned_to(&self, user: &AuthUser) -> bool {
        match (&self.assignee_uid, &self.assignee_email) {
            (Some(uid), _) => *uid == user.uid,
            (None, Some(email)) => user
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email)),
            (None, None) => false,
        }
    }

    /// Read visibility: admins see every task, members only their own.
    pub fn visible_to(&self, role: WorkspaceRole, user: &AuthUser) -> bool {
        match role {
            WorkspaceRole::Admin => true,
            WorkspaceRole::Member => self.is_assigned_to(user),
        }
    }
}

/// Request to create a task.
#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(custom(function = "validate_task_title"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_uid: Option<String>,
    pub assignee_email: Option<String>,
}

impl CreateTaskRequest {
    /// Materialize the task document for `actor`'s create.
    pub fn into_task(self, actor: &AuthUser, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            due_date: self.due_date,
            assignee_uid: self.assignee_uid,
            assignee_email: self.assignee_email,
            created_by_uid: actor.uid.clone(),
            created_by_email: actor.email.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full editable payload for a task update. The assignee fields are only
/// honored for admins; the service keeps the existing assignee otherwise.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(custom(function = "validate_task_title"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_uid: Option<String>,
    pub assignee_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_assigned_to(uid: Option<&str>, email: Option<&str>) -> Task {
        let actor = AuthUser::new("creator", "creator@example.com");
        let req = CreateTaskRequest {
            title: "Write report".into(),
            assignee_uid: uid.map(String::from),
            assignee_email: email.map(String::from),
            ..CreateTaskRequest::default()
        };
        req.into_task(&actor, Utc::now())
    }

    #[test]
    fn test_uid_match_is_authoritative() {
        let task = task_assigned_to(Some("u1"), Some("other@example.com"));
        let u1 = AuthUser::new("u1", "u1@example.com");
        let impostor = AuthUser::new("u2", "other@example.com");
        assert!(task.is_assigned_to(&u1));
        // Email matches but uid differs: not the assignee.
        assert!(!task.is_assigned_to(&impostor));
    }

    #[test]
    fn test_email_fallback_for_legacy_records() {
        let task = task_assigned_to(None, Some("Bob@Example.com"));
        let bob = AuthUser::new("u9", "bob@example.com");
        let carol = AuthUser::new("u8", "carol@example.com");
        assert!(task.is_assigned_to(&bob));
        assert!(!task.is_assigned_to(&carol));
    }

    #[test]
    fn test_unassigned_task_matches_nobody() {
        let task = task_assigned_to(None, None);
        let user = AuthUser::new("u1", "u1@example.com");
        assert!(!task.is_assigned_to(&user));
    }

    #[test]
    fn test_visibility() {
        let task = task_assigned_to(Some("u1"), None);
        let u1 = AuthUser::new("u1", "u1@example.com");
        let u2 = AuthUser::new("u2", "u2@example.com");
        assert!(task.visible_to(WorkspaceRole::Admin, &u2));
        assert!(task.visible_to(WorkspaceRole::Member, &u1));
        assert!(!task.visible_to(WorkspaceRole::Member, &u2));
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateTaskRequest {
            title: "Ship it".into(),
            ..CreateTaskRequest::default()
        };
        assert!(valid.validate().is_ok());

        let blank = CreateTaskRequest {
            title: "   ".into(),
            ..CreateTaskRequest::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_create_trims_title_and_description() {
        let actor = AuthUser::new("u1", "u1@example.com");
        let req = CreateTaskRequest {
            title: "  Ship it  ".into(),
            description: "  soon  ".into(),
            ..CreateTaskRequest::default()
        };
        let task = req.into_task(&actor, Utc::now());
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.description, "soon");
        assert!(!task.is_deleted);
        assert!(task.deleted_at.is_none());
    }

    #[test]
    fn test_task_field_names() {
        let task = task_assigned_to(Some("u1"), None);
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("isDeleted").is_some());
        assert!(json.get("assigneeUid").is_some());
        assert!(json.get("dueDate").is_some());
        assert!(json.get("createdByUid").is_some());
        assert_eq!(json["status"], "todo");
        assert!(json.get("id").is_none());
    }
}
