//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` payload as submitted by clients
//! - Typed create/update inputs produced by validating the payload

pub mod dashboard;
pub mod file;
pub mod invoice;
pub mod milestone;
pub mod project;
pub mod task;
pub mod team;
pub mod timeline_event;
pub mod user;
