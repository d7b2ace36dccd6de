//! Identity gateway boundary.
//!
//! Authentication is delegated to an external identity provider. This
//! module defines the trait the core consumes plus an in-process
//! implementation used by tests and embedders that manage sign-in
//! themselves.

use async_trait::async_trait;
use domain::models::AuthUser;
use tokio::sync::watch;

/// Live view of the authenticated user. `None` means signed out.
#[derive(Debug)]
pub struct AuthState {
    rx: watch::Receiver<Option<AuthUser>>,
}

impl AuthState {
    /// The user as of now.
    pub fn current(&self) -> Option<AuthUser> {
        self.rx.borrow().clone()
    }

    /// Wait for the next sign-in/sign-out transition. Returns the new
    /// state, or `None` if the gateway has gone away.
    pub async fn changed(&mut self) -> Option<Option<AuthUser>> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

/// The identity provider boundary consumed by the core.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Subscribe to auth state; the current state is observable immediately.
    fn auth_state(&self) -> AuthState;

    /// Sign the current user out.
    async fn sign_out(&self);
}

/// In-process identity gateway backed by a watch channel.
#[derive(Debug)]
pub struct StaticIdentity {
    tx: watch::Sender<Option<AuthUser>>,
}

impl StaticIdentity {
    /// Start signed out.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Start with `user` already signed in.
    pub fn signed_in(user: AuthUser) -> Self {
        let (tx, _) = watch::channel(Some(user));
        Self { tx }
    }

    pub fn sign_in(&self, user: AuthUser) {
        self.tx.send_replace(Some(user));
    }
}

impl Default for StaticIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityGateway for StaticIdentity {
    fn auth_state(&self) -> AuthState {
        AuthState {
            rx: self.tx.subscribe(),
        }
    }

    async fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_out_transitions() {
        let gateway = StaticIdentity::new();
        let mut state = gateway.auth_state();
        assert_eq!(state.current(), None);

        gateway.sign_in(AuthUser::new("u1", "a@b.com"));
        let next = state.changed().await.unwrap();
        assert_eq!(next.as_ref().map(|u| u.uid.as_str()), Some("u1"));

        gateway.sign_out().await;
        assert_eq!(state.changed().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_signed_in_constructor() {
        let gateway = StaticIdentity::signed_in(AuthUser::new("u1", "a@b.com"));
        let state = gateway.auth_state();
        assert!(state.current().is_some());
    }
}
