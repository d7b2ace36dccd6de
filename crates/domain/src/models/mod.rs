//! Domain models for Teamdesk.

pub mod activity;
pub mod invite;
pub mod member;
pub mod task;
pub mod user;
pub mod workspace;

pub use activity::{ActivityEntry, ActivityKind};
pub use invite::{InboxInvite, Invite, InviteMemberRequest, InviteStatus};
pub use member::{Member, WorkspaceRole};
pub use task::{CreateTaskRequest, Task, TaskStatus, UpdateTaskRequest};
pub use user::{AuthUser, UserRecord};
pub use workspace::{Workspace, DEFAULT_WORKSPACE_NAME};
