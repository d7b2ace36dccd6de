//! Pure domain services.

pub mod invite_prompt;

pub use invite_prompt::{InvitePrompt, PromptState};
