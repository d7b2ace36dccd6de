//! Workspace activity log.
//!
//! Appends are a non-critical side effect of mutations: a failed append is
//! logged as a warning and never becomes the caller's result.

use chrono::Utc;
use domain::models::{ActivityEntry, ActivityKind, AuthUser};
use persistence::repositories::ActivityRepository;
use persistence::store::MemoryStore;
use uuid::Uuid;

use crate::error::CoreError;

/// Append-only audit trail of workspace mutations.
#[derive(Clone)]
pub struct ActivityLog {
    repo: ActivityRepository,
}

impl ActivityLog {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            repo: ActivityRepository::new(store),
        }
    }

    /// Best-effort append. Errors are warned about, never propagated.
    pub async fn record(
        &self,
        workspace_id: Uuid,
        actor: &AuthUser,
        kind: ActivityKind,
        message: impl Into<String>,
    ) {
        let entry = ActivityEntry::new(actor, kind, message, Utc::now());
        if let Err(err) = self.repo.append(workspace_id, &entry).await {
            tracing::warn!(%workspace_id, error = %err, "failed to append activity entry");
        }
    }

    /// Most recent entries, newest first.
    pub async fn recent(
        &self,
        workspace_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, CoreError> {
        Ok(self.repo.recent(workspace_id, limit).await?)
    }
}
