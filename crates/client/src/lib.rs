//! Application core for Teamdesk, exposed to the presentation layer.
//!
//! This crate wires the domain and persistence layers into the services a
//! UI consumes: workspace provisioning, the invite ledger, the task ledger,
//! the activity log, and realtime sync feeds. There are no ambient
//! singletons; everything hangs off an explicit [`Core`] handle and the
//! session objects it produces.

pub mod core;
pub mod error;
pub mod identity;
pub mod services;

pub use crate::core::{Core, Session};
pub use crate::error::CoreError;
