//! Handlers for the `/teams` resource.

use agency_core::types::DbId;
use agency_db::models::team::{ManagedTeamMember, Team, TeamPayload, TeamSummary};
use agency_db::repositories::TeamRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireProjectManager};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/teams
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<TeamSummary>>>> {
    let teams = TeamRepo::list_with_stats(&state.pool).await?;
    Ok(Json(DataResponse::new(teams)))
}

/// POST /api/v1/teams
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<TeamPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<Team>>)> {
    let input = payload.into_input()?;
    let team = TeamRepo::create(&state.pool, &input).await?;

    tracing::info!(team_id = team.id, user_id = admin.id, members = input.member_ids.len(), "Team created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(team))))
}

/// PUT /api/v1/teams/{id}
///
/// Replaces the roster: listed users are kept or added, everyone else is
/// deactivated.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(payload): Json<TeamPayload>,
) -> AppResult<Json<DataResponse<Team>>> {
    let input = payload.into_input()?;
    let team = TeamRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Team", id))?;

    tracing::info!(team_id = id, user_id = admin.id, "Team updated");
    Ok(Json(DataResponse::new(team)))
}

/// DELETE /api/v1/teams/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TeamRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Team", id));
    }
    tracing::info!(team_id = id, user_id = admin.id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/teams/managed
///
/// Members of the teams the calling project manager leads.
pub async fn managed(
    State(state): State<AppState>,
    RequireProjectManager(actor): RequireProjectManager,
) -> AppResult<Json<DataResponse<Vec<ManagedTeamMember>>>> {
    let members = TeamRepo::managed_members(&state.pool, actor.id).await?;
    Ok(Json(DataResponse::new(members)))
}
