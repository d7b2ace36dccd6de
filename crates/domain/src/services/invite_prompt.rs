//! Invite prompt display policy.
//!
//! Decides whether the UI should surface a pending invite. Each inbox
//! snapshot is authoritative-as-of-now: the machine re-evaluates the full
//! list on every push and never diffs. Closing the dialog suppresses that
//! one invite until its id changes or disappears; a later, distinct invite
//! is still surfaced to the same user.

use uuid::Uuid;

use crate::models::InboxInvite;

/// Observable state of the invite prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptState {
    /// Nothing to show.
    Idle,
    /// A pending invite the user has not dismissed.
    Showing(InboxInvite),
    /// The user closed the dialog for this invite id; stay quiet until a
    /// different invite arrives.
    Dismissed(Uuid),
}

impl PromptState {
    pub fn showing(&self) -> Option<&InboxInvite> {
        match self {
            PromptState::Showing(invite) => Some(invite),
            _ => None,
        }
    }
}

/// The prompt state machine. One per signed-in identity.
#[derive(Debug, Default)]
pub struct InvitePrompt {
    state: PromptState,
}

impl Default for PromptState {
    fn default() -> Self {
        PromptState::Idle
    }
}

impl InvitePrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PromptState {
        &self.state
    }

    /// Re-evaluate against a full inbox snapshot.
    ///
    /// `active_workspace` is the user's current workspace, if any; an invite
    /// targeting it is treated as already satisfied and suppressed.
    pub fn observe(
        &mut self,
        inbox: &[InboxInvite],
        active_workspace: Option<Uuid>,
    ) -> &PromptState {
        let next = inbox.iter().find(|item| item.is_pending());

        let Some(next) = next else {
            // Inbox drained: clear dismissal memory so a future invite with
            // a new id is surfaced again.
            self.state = PromptState::Idle;
            return &self.state;
        };

        if let PromptState::Dismissed(id) = self.state {
            if id == next.invite_id {
                return &self.state;
            }
        }

        if Some(next.workspace_id) == active_workspace {
            // Already a member of the target workspace; nothing to offer.
            self.state = PromptState::Idle;
        } else {
            self.state = PromptState::Showing(next.clone());
        }
        &self.state
    }

    /// The user closed the dialog without resolving the invite.
    pub fn dismiss(&mut self) {
        if let PromptState::Showing(invite) = &self.state {
            self.state = PromptState::Dismissed(invite.invite_id);
        }
    }

    /// The shown invite was accepted or declined.
    pub fn resolved(&mut self) {
        self.state = PromptState::Idle;
    }
}
