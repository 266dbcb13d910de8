use crate::status::ProjectStatus;
use crate::types::DbId;
use crate::validation::FieldError;

/// Domain error taxonomy shared by every layer.
///
/// Each variant maps to one stable, machine-readable error kind at the HTTP
/// boundary (see `agency_api::error`).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {}", describe_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid status transition from {current} to {requested}")]
    InvalidTransition {
        current: ProjectStatus,
        requested: ProjectStatus,
    },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Dashboard data is currently unavailable")]
    DashboardUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        CoreError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        CoreError::AccessDenied(message.into())
    }
}

fn describe_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}
