//! Task ledger: CRUD plus the soft-delete lifecycle.
//!
//! Policy, stated once here and enforced before any write:
//! - only admins set or change a task's assignee; a non-admin create
//!   self-assigns
//! - status moves belong to the current assignee alone, admins included
//! - permanent deletion is admin-only and only for already-trashed tasks
//! - admins see every task, members only the ones assigned to them

use chrono::Utc;
use domain::models::{
    ActivityKind, AuthUser, CreateTaskRequest, Member, Task, TaskStatus, UpdateTaskRequest,
};
use persistence::repositories::{MemberRepository, TaskRepository};
use persistence::store::MemoryStore;
use uuid::Uuid;
use validator::Validate;

use crate::error::CoreError;
use crate::services::ActivityLog;

/// Drives the task lifecycle within a workspace.
#[derive(Clone)]
pub struct TaskLedger {
    tasks: TaskRepository,
    members: MemberRepository,
    activity: ActivityLog,
}

impl TaskLedger {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            tasks: TaskRepository::new(store.clone()),
            members: MemberRepository::new(store.clone()),
            activity: ActivityLog::new(store),
        }
    }

    /// Create a task. Non-admins cannot assign anyone but themselves.
    pub async fn create(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        mut request: CreateTaskRequest,
    ) -> Result<Uuid, CoreError> {
        request.validate()?;
        let membership = self.require_member(workspace_id, actor).await?;

        if !membership.is_admin() {
            let assigns_other = request
                .assignee_uid
                .as_deref()
                .is_some_and(|uid| uid != actor.uid);
            if assigns_other {
                return Err(CoreError::Authorization(
                    "Only workspace admins can assign tasks".into(),
                ));
            }
            request.assignee_uid = Some(actor.uid.clone());
            request.assignee_email = actor.email.clone();
        }

        let task = request.into_task(actor, Utc::now());
        self.tasks.save(workspace_id, &task).await?;

        self.activity
            .record(
                workspace_id,
                actor,
                ActivityKind::Task,
                format!("Created task: {}", task.title),
            )
            .await;
        Ok(task.id)
    }

    /// Edit a task's fields.
    ///
    /// Assignee changes require admin; status changes require being the
    /// assignee (use [`TaskLedger::move_status`] for a bare move).
    pub async fn update(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        task_id: Uuid,
        request: UpdateTaskRequest,
    ) -> Result<(), CoreError> {
        request.validate()?;
        let membership = self.require_member(workspace_id, actor).await?;
        let mut task = self.require_visible(workspace_id, actor, &membership, task_id).await?;

        if request.status != task.status && !task.is_assigned_to(actor) {
            return Err(CoreError::Authorization(
                "Only the assignee can move a task's status".into(),
            ));
        }

        if membership.is_admin() {
            task.assignee_uid = request.assignee_uid;
            task.assignee_email = request.assignee_email;
        } else {
            let changes_assignee = request.assignee_uid != task.assignee_uid
                && request.assignee_uid.is_some();
            if changes_assignee {
                return Err(CoreError::Authorization(
                    "Only workspace admins can change a task's assignee".into(),
                ));
            }
        }

        task.title = request.title.trim().to_string();
        task.description = request.description.trim().to_string();
        task.status = request.status;
        task.due_date = request.due_date;
        task.updated_at = Utc::now();
        self.tasks.save(workspace_id, &task).await?;

        self.activity
            .record(
                workspace_id,
                actor,
                ActivityKind::Task,
                format!("Updated task: {}", task.title),
            )
            .await;
        Ok(())
    }

    /// Move a task between the board columns. Assignee-only, admins
    /// included; moving to the current status is a no-op.
    pub async fn move_status(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<(), CoreError> {
        self.require_member(workspace_id, actor).await?;
        let mut task = self.require_task(workspace_id, task_id).await?;

        if !task.is_assigned_to(actor) {
            return Err(CoreError::Authorization(
                "Only the assignee can move a task's status".into(),
            ));
        }
        if task.status == status {
            return Ok(());
        }

        task.status = status;
        task.updated_at = Utc::now();
        self.tasks.save(workspace_id, &task).await?;

        self.activity
            .record(
                workspace_id,
                actor,
                ActivityKind::Task,
                format!(
                    "Moved task: {} → {}",
                    task.title,
                    status.as_str().to_uppercase()
                ),
            )
            .await;
        Ok(())
    }

    /// Soft-delete: hide the task behind the `isDeleted` flag, reversibly.
    pub async fn soft_delete(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        task_id: Uuid,
    ) -> Result<(), CoreError> {
        let membership = self.require_member(workspace_id, actor).await?;
        let mut task = self.require_visible(workspace_id, actor, &membership, task_id).await?;

        let now = Utc::now();
        task.is_deleted = true;
        task.deleted_at = Some(now);
        task.updated_at = now;
        self.tasks.save(workspace_id, &task).await?;

        self.activity
            .record(
                workspace_id,
                actor,
                ActivityKind::Trash,
                format!("Moved to trash: {}", task.title),
            )
            .await;
        Ok(())
    }

    /// Restore a trashed task to the active board.
    pub async fn restore(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        task_id: Uuid,
    ) -> Result<(), CoreError> {
        let membership = self.require_member(workspace_id, actor).await?;
        let mut task = self.require_visible(workspace_id, actor, &membership, task_id).await?;

        task.is_deleted = false;
        task.deleted_at = None;
        task.updated_at = Utc::now();
        self.tasks.save(workspace_id, &task).await?;

        self.activity
            .record(
                workspace_id,
                actor,
                ActivityKind::Trash,
                format!("Restored task: {}", task.title),
            )
            .await;
        Ok(())
    }

    /// Hard, irreversible removal. Admin-only, and the task must already
    /// be in the trash.
    pub async fn permanent_delete(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        task_id: Uuid,
    ) -> Result<(), CoreError> {
        let membership = self.require_member(workspace_id, actor).await?;
        if !membership.is_admin() {
            return Err(CoreError::Authorization(
                "Only workspace admins can delete tasks permanently".into(),
            ));
        }

        let task = self.require_task(workspace_id, task_id).await?;
        if !task.is_deleted {
            return Err(CoreError::Validation(
                "Task must be in the trash before permanent deletion".into(),
            ));
        }

        self.tasks.delete(workspace_id, task_id).await?;

        self.activity
            .record(
                workspace_id,
                actor,
                ActivityKind::Trash,
                format!("Deleted forever: {}", task.title),
            )
            .await;
        Ok(())
    }

    /// Active tasks the actor may see: all of them for admins, their own
    /// for members.
    pub async fn list_visible(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
    ) -> Result<Vec<Task>, CoreError> {
        let membership = self.require_member(workspace_id, actor).await?;
        Ok(self
            .tasks
            .list_active(workspace_id)
            .await?
            .into_iter()
            .filter(|t| t.visible_to(membership.role, actor))
            .collect())
    }

    /// Trashed tasks the actor may see.
    pub async fn list_trash(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
    ) -> Result<Vec<Task>, CoreError> {
        let membership = self.require_member(workspace_id, actor).await?;
        Ok(self
            .tasks
            .list_trashed(workspace_id)
            .await?
            .into_iter()
            .filter(|t| t.visible_to(membership.role, actor))
            .collect())
    }

    async fn require_member(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
    ) -> Result<Member, CoreError> {
        self.members
            .get(workspace_id, &actor.uid)
            .await?
            .ok_or_else(|| {
                CoreError::Authorization(format!(
                    "{} is not a member of this workspace",
                    actor.uid
                ))
            })
    }

    async fn require_task(&self, workspace_id: Uuid, task_id: Uuid) -> Result<Task, CoreError> {
        self.tasks
            .get(workspace_id, task_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("task {task_id}")))
    }

    async fn require_visible(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        membership: &Member,
        task_id: Uuid,
    ) -> Result<Task, CoreError> {
        let task = self.require_task(workspace_id, task_id).await?;
        if !task.visible_to(membership.role, actor) {
            return Err(CoreError::Authorization(
                "Task is not visible to this member".into(),
            ));
        }
        Ok(task)
    }
}
