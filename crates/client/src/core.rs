//! The [`Core`] handle and session lifecycle.
//!
//! `Core` owns one store handle and hands out the application services.
//! A [`Session`] is the product of a sign-in: the authenticated user plus
//! their resolved workspace, ready for the presentation layer to subscribe
//! and mutate through.

use domain::models::AuthUser;
use persistence::store::MemoryStore;
use uuid::Uuid;

use crate::error::CoreError;
use crate::identity::IdentityGateway;
use crate::services::{
    ActivityLog, InviteLedger, RealtimeSync, TaskLedger, WorkspaceProvisioner,
};

/// An authenticated user bound to their active workspace.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub workspace_id: Uuid,
}

/// Entry point wiring the services over one shared store.
#[derive(Clone)]
pub struct Core {
    pub provisioner: WorkspaceProvisioner,
    pub invites: InviteLedger,
    pub tasks: TaskLedger,
    pub activity: ActivityLog,
    pub sync: RealtimeSync,
}

impl Core {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            provisioner: WorkspaceProvisioner::new(store.clone()),
            invites: InviteLedger::new(store.clone()),
            tasks: TaskLedger::new(store.clone()),
            activity: ActivityLog::new(store.clone()),
            sync: RealtimeSync::new(store),
        }
    }

    /// Establish a session for an authenticated user.
    ///
    /// Upserts the identity record, then resolves the workspace link,
    /// provisioning a fresh workspace for a first-time user. Safe to call
    /// from concurrent tabs; every caller lands on the same workspace.
    pub async fn start_session(&self, user: &AuthUser) -> Result<Session, CoreError> {
        self.provisioner.ensure_user_record(user).await?;
        let workspace_id = self.provisioner.ensure_workspace(user).await?;
        tracing::debug!(uid = %user.uid, %workspace_id, "session started");
        Ok(Session {
            user: user.clone(),
            workspace_id,
        })
    }

    /// Wait for the gateway to report a signed-in user, then establish a
    /// session for them. Returns `None` if the gateway goes away without a
    /// sign-in ever arriving.
    pub async fn session_from(
        &self,
        gateway: &dyn IdentityGateway,
    ) -> Result<Option<Session>, CoreError> {
        let mut state = gateway.auth_state();
        let user = match state.current() {
            Some(user) => user,
            None => loop {
                match state.changed().await {
                    Some(Some(user)) => break user,
                    Some(None) => continue,
                    None => return Ok(None),
                }
            },
        };
        self.start_session(&user).await.map(Some)
    }

    /// Re-resolve the active workspace after an invite acceptance moved
    /// the user.
    pub async fn refresh_session(&self, session: &Session) -> Result<Session, CoreError> {
        let workspace_id = self
            .provisioner
            .workspace_id_for(&session.user.uid)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("workspace link for {}", session.user.uid)))?;
        Ok(Session {
            user: session.user.clone(),
            workspace_id,
        })
    }
}
