//! Domain layer for the Teamdesk core.
//!
//! This crate contains:
//! - Domain models (Workspace, Member, Invite, Task, ActivityEntry)
//! - Pure domain services (invite prompt policy, task policy)
//!
//! No I/O happens here; documents are parsed into these types at the
//! persistence boundary and all policy decisions are plain functions.

pub mod models;
pub mod services;
