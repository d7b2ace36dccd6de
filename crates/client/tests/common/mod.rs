//! Common test utilities for integration tests.

// Allow dead code in this module - these are helper utilities that may not be
// used by all integration tests but are intentionally available for future use.
#![allow(dead_code)]

use domain::models::{AuthUser, InboxInvite, InviteMemberRequest};
use persistence::store::MemoryStore;
use teamdesk_client::{Core, Session};

/// Initialise tracing once for the test binary. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh core over an empty in-memory store.
pub fn new_core() -> (Core, MemoryStore) {
    init_tracing();
    let store = MemoryStore::new();
    (Core::new(store.clone()), store)
}

pub fn auth_user(uid: &str, email: &str) -> AuthUser {
    AuthUser::new(uid, email)
}

/// Unique email per test to keep inboxes isolated.
pub fn unique_test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

/// Sign in a user and provision (or resolve) their workspace.
pub async fn start_session(core: &Core, uid: &str, email: &str) -> Session {
    core.start_session(&auth_user(uid, email))
        .await
        .expect("Failed to start session")
}

/// Send an invite from an admin session and return the invitee's inbox item.
pub async fn invite_and_fetch(
    core: &Core,
    admin: &Session,
    invitee_email: &str,
) -> InboxInvite {
    let invite_id = core
        .invites
        .invite(
            admin.workspace_id,
            &admin.user,
            InviteMemberRequest {
                email: invitee_email.to_string(),
            },
        )
        .await
        .expect("Failed to create invite");

    core.invites
        .list_inbox(invitee_email)
        .await
        .expect("Failed to read inbox")
        .into_iter()
        .find(|item| item.invite_id == invite_id)
        .expect("Invite did not reach the inbox")
}

/// Full join flow: invite, sign the invitee in, accept, return their session
/// in the admin's workspace.
pub async fn join_workspace(
    core: &Core,
    admin: &Session,
    uid: &str,
    email: &str,
) -> Session {
    let item = invite_and_fetch(core, admin, email).await;
    let member = start_session(core, uid, email).await;
    core.invites
        .accept(&member.user, &item)
        .await
        .expect("Failed to accept invite");
    core.refresh_session(&member)
        .await
        .expect("Failed to refresh session")
}
