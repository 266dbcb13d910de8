//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement with 403.

use agency_core::roles::{Actor, Role};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `ADMIN` role.
pub struct RequireAdmin(pub Actor);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(actor) = AuthUser::from_request_parts(parts, state).await?;
        actor.ensure_admin()?;
        Ok(RequireAdmin(actor))
    }
}

/// Requires `ADMIN` or `PROJECT_MANAGER`, the roles allowed to mutate
/// projects, tasks, invoices, milestones and timeline events.
pub struct RequireManager(pub Actor);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(actor) = AuthUser::from_request_parts(parts, state).await?;
        actor.ensure_can_manage()?;
        Ok(RequireManager(actor))
    }
}

/// Requires exactly `PROJECT_MANAGER`.
pub struct RequireProjectManager(pub Actor);

impl FromRequestParts<AppState> for RequireProjectManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(actor) = AuthUser::from_request_parts(parts, state).await?;
        actor.ensure_role(Role::ProjectManager)?;
        Ok(RequireProjectManager(actor))
    }
}
