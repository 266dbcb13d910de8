//! Handlers for the `/team-members` resource.
//!
//! Admins may change any team; a project manager only teams they lead.

use agency_core::access::ensure_team_manager;
use agency_core::roles::Actor;
use agency_core::types::DbId;
use agency_db::models::team::{RolePayload, Team, TeamMember, TeamMemberPayload};
use agency_db::repositories::{TeamMemberRepo, TeamRepo};
use agency_db::DbPool;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn managed_team(pool: &DbPool, actor: &Actor, team_id: DbId) -> AppResult<Team> {
    let team = TeamRepo::find_by_id(pool, team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team", team_id))?;
    ensure_team_manager(actor, team.team_lead_id)?;
    Ok(team)
}

async fn find_member(pool: &DbPool, id: DbId) -> AppResult<TeamMember> {
    TeamMemberRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("TeamMember", id))
}

/// POST /api/v1/team-members
pub async fn add(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<TeamMemberPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<TeamMember>>)> {
    let input = payload.into_input()?;
    managed_team(&state.pool, &actor, input.team_id).await?;

    let member = TeamMemberRepo::add(&state.pool, &input).await?;
    tracing::info!(
        team_id = input.team_id,
        member_user_id = input.user_id,
        role = %input.role,
        user_id = actor.id,
        "Team member added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(member))))
}

/// PUT /api/v1/team-members/{id}/role
///
/// Promoting to LEAD demotes the team's current lead atomically.
pub async fn set_role(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<DbId>,
    Json(payload): Json<RolePayload>,
) -> AppResult<Json<DataResponse<TeamMember>>> {
    let role = payload.into_role()?;
    let member = find_member(&state.pool, id).await?;
    managed_team(&state.pool, &actor, member.team_id).await?;

    let member = TeamMemberRepo::set_role(&state.pool, id, role)
        .await?
        .ok_or_else(|| AppError::not_found("TeamMember", id))?;
    tracing::info!(member_id = id, team_id = member.team_id, role = %role, user_id = actor.id, "Team member role changed");
    Ok(Json(DataResponse::new(member)))
}

/// DELETE /api/v1/team-members/{id}
///
/// Deactivates the membership; the row stays for history.
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let member = find_member(&state.pool, id).await?;
    managed_team(&state.pool, &actor, member.team_id).await?;

    TeamMemberRepo::deactivate(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("TeamMember", id))?;
    tracing::info!(member_id = id, team_id = member.team_id, user_id = actor.id, "Team member removed");
    Ok(StatusCode::NO_CONTENT)
}
