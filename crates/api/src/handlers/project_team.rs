//! Handlers for a project's own team: `/projects/{id}/team` and
//! `/projects/{id}/team-members`.

use agency_core::error::CoreError;
use agency_core::status::TeamRole;
use agency_core::types::DbId;
use agency_db::models::team::{ProjectTeamAction, TeamMember, TeamMemberWithUser};
use agency_db::repositories::{ProjectRepo, TeamMemberRepo};
use agency_db::DbPool;
use axum::extract::{Path, State};
use axum::Json;

use super::project::ensure_readable;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/team-members
pub async fn list_members(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TeamMemberWithUser>>>> {
    ensure_readable(&state.pool, &actor, id).await?;
    let members = active_roster(&state.pool, id).await?;
    Ok(Json(DataResponse::new(members)))
}

/// PUT /api/v1/projects/{id}/team
///
/// Body is tagged by `action`:
///
/// | action          | fields                     |
/// |-----------------|----------------------------|
/// | `add_members`   | `members: [{user_id, role}]` |
/// | `remove_member` | `member_id`                |
/// | `update_role`   | `member_id`, `role`        |
///
/// Responds with the project's active roster after the change.
pub async fn update_team(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(action): Json<ProjectTeamAction>,
) -> AppResult<Json<DataResponse<Vec<TeamMemberWithUser>>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;

    match action {
        ProjectTeamAction::AddMembers { members } => {
            let assignments = members
                .iter()
                .map(|m| Ok((m.user_id, m.team_role()?)))
                .collect::<Result<Vec<(DbId, TeamRole)>, CoreError>>()?;

            let team_id = ProjectRepo::ensure_team(&state.pool, &project).await?;
            TeamMemberRepo::add_many(&state.pool, team_id, &assignments).await?;
            tracing::info!(
                project_id = id,
                team_id,
                user_id = actor.id,
                added = assignments.len(),
                "Project team members added"
            );
        }
        ProjectTeamAction::RemoveMember { member_id } => {
            project_member(&state.pool, project.team_id, member_id).await?;
            TeamMemberRepo::deactivate(&state.pool, member_id).await?;
            tracing::info!(project_id = id, member_id, user_id = actor.id, "Project team member removed");
        }
        ProjectTeamAction::UpdateRole { member_id, role } => {
            let role: TeamRole = role.parse()?;
            project_member(&state.pool, project.team_id, member_id).await?;
            TeamMemberRepo::set_role(&state.pool, member_id, role)
                .await?
                .ok_or_else(|| AppError::not_found("TeamMember", member_id))?;
            tracing::info!(
                project_id = id,
                member_id,
                role = %role,
                user_id = actor.id,
                "Project team member role changed"
            );
        }
    }

    let members = active_roster(&state.pool, id).await?;
    Ok(Json(DataResponse::new(members)))
}

/// A membership row that belongs to the project's team, or 404.
async fn project_member(
    pool: &DbPool,
    team_id: Option<DbId>,
    member_id: DbId,
) -> AppResult<TeamMember> {
    let member = TeamMemberRepo::find_by_id(pool, member_id).await?;
    match (member, team_id) {
        (Some(member), Some(team_id)) if member.team_id == team_id => Ok(member),
        _ => Err(AppError::not_found("TeamMember", member_id)),
    }
}

async fn active_roster(pool: &DbPool, project_id: DbId) -> AppResult<Vec<TeamMemberWithUser>> {
    let team_id = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .and_then(|p| p.team_id);
    match team_id {
        Some(team_id) => Ok(TeamMemberRepo::list_active_for_team(pool, team_id).await?),
        None => Ok(Vec::new()),
    }
}
