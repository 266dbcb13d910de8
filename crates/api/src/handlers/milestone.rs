//! Handlers for project milestones.

use agency_core::types::DbId;
use agency_db::models::milestone::{Milestone, MilestonePayload};
use agency_db::repositories::{MilestoneRepo, ProjectRepo};
use agency_db::DbPool;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::project::ensure_readable;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_milestone(pool: &DbPool, id: DbId) -> AppResult<Milestone> {
    MilestoneRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))
}

/// GET /api/v1/projects/{id}/milestones
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Milestone>>>> {
    ensure_readable(&state.pool, &actor, project_id).await?;
    let milestones = MilestoneRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse::new(milestones)))
}

/// POST /api/v1/projects/{id}/milestones
pub async fn create(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(project_id): Path<DbId>,
    Json(payload): Json<MilestonePayload>,
) -> AppResult<(StatusCode, Json<DataResponse<Milestone>>)> {
    let input = payload.into_input()?;
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))?;

    let milestone = MilestoneRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(
        milestone_id = milestone.id,
        project_id,
        user_id = actor.id,
        "Milestone created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(milestone))))
}

/// PUT /api/v1/milestones/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<MilestonePayload>,
) -> AppResult<Json<DataResponse<Milestone>>> {
    let input = payload.into_input()?;
    let existing = find_milestone(&state.pool, id).await?;
    let milestone = MilestoneRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))?;

    tracing::info!(
        milestone_id = id,
        project_id = existing.project_id,
        user_id = actor.id,
        "Milestone updated"
    );
    Ok(Json(DataResponse::new(milestone)))
}

/// DELETE /api/v1/milestones/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_milestone(&state.pool, id).await?;
    if !MilestoneRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Milestone", id));
    }
    tracing::info!(
        milestone_id = id,
        project_id = existing.project_id,
        user_id = actor.id,
        "Milestone deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
