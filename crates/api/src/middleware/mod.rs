//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated actor from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `ADMIN` role.
//! - [`rbac::RequireManager`] -- Requires `ADMIN` or `PROJECT_MANAGER`.
//! - [`rbac::RequireProjectManager`] -- Requires exactly `PROJECT_MANAGER`.

pub mod auth;
pub mod rbac;
