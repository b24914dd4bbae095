//! # API Shared
//!
//! Shared utilities for the clinical records APIs and CLI.
//!
//! Contains:
//! - Shared services like `HealthService`
//! - Authentication utilities: password hashing and session token issuance
//!
//! Used by `api-rest` and `records-cli` for common functionality.

pub mod auth;
pub mod health;

pub use auth::{hash_password, issue_token, verify_password, AuthError};
pub use health::{HealthRes, HealthService};
