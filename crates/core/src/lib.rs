//! Domain core for the agency dashboard.
//!
//! Everything in this crate is free of database and HTTP dependencies so the
//! access rules, status machine, and dashboard math can be exercised in
//! isolation by the repository and API layers (and their tests).

pub mod access;
pub mod dashboard;
pub mod error;
pub mod files;
pub mod progress;
pub mod roles;
pub mod search;
pub mod status;
pub mod storage;
pub mod transition;
pub mod types;
pub mod validation;
