//! Handlers for project timeline events.

use agency_core::types::DbId;
use agency_db::models::timeline_event::{TimelineEvent, TimelineEventPayload};
use agency_db::repositories::{ProjectRepo, TimelineEventRepo};
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

async fn find_event(pool: &DbPool, id: DbId) -> AppResult<TimelineEvent> {
    TimelineEventRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("TimelineEvent", id))
}

/// GET /api/v1/projects/{id}/timeline-events
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TimelineEvent>>>> {
    ensure_readable(&state.pool, &actor, project_id).await?;
    let events = TimelineEventRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse::new(events)))
}

/// POST /api/v1/projects/{id}/timeline-events
pub async fn create(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(project_id): Path<DbId>,
    Json(payload): Json<TimelineEventPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<TimelineEvent>>)> {
    let input = payload.into_input()?;
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))?;

    let event = TimelineEventRepo::create(&state.pool, project_id, actor.id, &input).await?;
    tracing::info!(event_id = event.id, project_id, user_id = actor.id, "Timeline event created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(event))))
}

/// PUT /api/v1/timeline-events/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<TimelineEventPayload>,
) -> AppResult<Json<DataResponse<TimelineEvent>>> {
    let input = payload.into_input()?;
    let existing = find_event(&state.pool, id).await?;
    let event = TimelineEventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("TimelineEvent", id))?;

    tracing::info!(
        event_id = id,
        project_id = existing.project_id,
        user_id = actor.id,
        "Timeline event updated"
    );
    Ok(Json(DataResponse::new(event)))
}

/// DELETE /api/v1/timeline-events/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_event(&state.pool, id).await?;
    if !TimelineEventRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("TimelineEvent", id));
    }
    tracing::info!(
        event_id = id,
        project_id = existing.project_id,
        user_id = actor.id,
        "Timeline event deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
