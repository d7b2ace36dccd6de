//! Persistence layer for the Teamdesk core.
//!
//! This crate contains:
//! - The document store boundary (`store`): hierarchical collections,
//!   single-document writes, an exclusive transaction section, and live
//!   collection subscriptions
//! - Repository implementations that parse raw documents into typed domain
//!   entities at the boundary

pub mod metrics;
pub mod repositories;
pub mod store;
