//! Bearer token handling.
//!
//! Tokens are issued by the identity provider; this service only verifies
//! them. [`jwt::generate_access_token`] exists for tests and tooling.

pub mod jwt;
