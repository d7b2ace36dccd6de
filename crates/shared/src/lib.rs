//! Shared utilities for the Teamdesk core.
//!
//! This crate provides common functionality used across all other crates:
//! - Email normalization (the invite-delivery key)
//! - Common validation logic

pub mod validation;
