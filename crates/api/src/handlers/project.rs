//! Handlers for the `/projects` resource.

use agency_core::access::{ensure_project_readable, ProjectRelations, ResourceKind, ScopeFilter};
use agency_core::error::CoreError;
use agency_core::roles::{Actor, Role};
use agency_core::transition::validate_transition;
use agency_core::types::DbId;
use agency_db::models::project::{
    BudgetPayload, Project, ProjectDetail, ProjectFormOptions, ProjectPayload, ProjectQuery,
    ProjectSummary, StatusPayload, TimelinePayload,
};
use agency_db::models::team::TeamMemberWithUser;
use agency_db::repositories::{
    FileRepo, InvoiceRepo, MilestoneRepo, ProjectRepo, TaskRepo, TeamMemberRepo, TeamRepo,
    TimelineEventRepo, UserRepo,
};
use agency_db::DbPool;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::delete_best_effort;

/// Load the relations access decisions are made from, or 404.
pub(crate) async fn project_relations(pool: &DbPool, id: DbId) -> AppResult<ProjectRelations> {
    ProjectRepo::relations(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))
}

/// 404 if the project is missing, 403 if `actor` may not read it.
pub(crate) async fn ensure_readable(pool: &DbPool, actor: &Actor, id: DbId) -> AppResult<()> {
    let relations = project_relations(pool, id).await?;
    ensure_project_readable(actor, &relations)?;
    Ok(())
}

async fn find_project(pool: &DbPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))
}

/// GET /api/v1/projects
///
/// Scoped listing. Any filter switches to search mode.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ProjectQuery>,
) -> AppResult<Json<DataResponse<Vec<ProjectSummary>>>> {
    let filters = query.into_filters()?;
    let scope = ScopeFilter::for_actor(&actor, ResourceKind::Project)?;
    let rows = ProjectRepo::list(&state.pool, &scope, &filters).await?;

    let projects = rows
        .into_iter()
        .map(|row| ProjectSummary::for_viewer(row, actor.role))
        .collect();
    Ok(Json(DataResponse::new(projects)))
}

/// GET /api/v1/projects/form-options
pub async fn form_options(
    State(state): State<AppState>,
    RequireManager(_actor): RequireManager,
) -> AppResult<Json<DataResponse<ProjectFormOptions>>> {
    let (clients, managers, teams) = tokio::try_join!(
        UserRepo::list_active_by_roles(&state.pool, &[Role::Client]),
        UserRepo::list_active_by_roles(&state.pool, &[Role::ProjectManager]),
        TeamRepo::list_options(&state.pool),
    )?;
    Ok(Json(DataResponse::new(ProjectFormOptions {
        clients,
        managers,
        teams,
    })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    ensure_readable(&state.pool, &actor, id).await?;

    let pool = &state.pool;
    let summary = ProjectRepo::find_summary(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;
    let team_id = summary.project.team_id;

    let team_members = async {
        match team_id {
            Some(team_id) => TeamMemberRepo::list_active_for_team(pool, team_id).await,
            None => Ok(Vec::<TeamMemberWithUser>::new()),
        }
    };
    let (message_count, tasks, files, invoices, milestones, timeline_events, team_members) = tokio::try_join!(
        ProjectRepo::message_count(pool, id),
        TaskRepo::list_for_project(pool, id),
        FileRepo::list_for_project(pool, id),
        InvoiceRepo::list_for_project(pool, id),
        MilestoneRepo::list_for_project(pool, id),
        TimelineEventRepo::list_for_project(pool, id),
        team_members,
    )?;

    Ok(Json(DataResponse::new(ProjectDetail {
        summary: ProjectSummary::for_viewer(summary, actor.role),
        message_count,
        tasks,
        files,
        invoices,
        milestones,
        timeline_events,
        team_members,
    })))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Json(payload): Json<ProjectPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let input = payload.into_create(&actor)?;
    let project = ProjectRepo::create(&state.pool, &input).await?;

    tracing::info!(
        project_id = project.id,
        user_id = actor.id,
        manager_id = project.manager_id,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(project))))
}

/// PUT /api/v1/projects/{id}
///
/// Partial update. A status change must be a legal transition.
pub async fn update(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<ProjectPayload>,
) -> AppResult<Json<DataResponse<Project>>> {
    let existing = find_project(&state.pool, id).await?;
    let input = payload.into_update(&actor)?;
    let expected_status = match input.status {
        Some(requested) if requested != existing.status => {
            validate_transition(existing.status, requested)?;
            Some(existing.status)
        }
        _ => None,
    };

    let project = ProjectRepo::update(&state.pool, id, &input, expected_status)
        .await?
        .ok_or_else(|| match expected_status {
            Some(_) => concurrent_status_change(),
            None => AppError::not_found("Project", id),
        })?;

    tracing::info!(project_id = id, user_id = actor.id, "Project updated");
    Ok(Json(DataResponse::new(project)))
}

/// PUT /api/v1/projects/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<DataResponse<Project>>> {
    let change = payload.into_change()?;
    let existing = find_project(&state.pool, id).await?;
    validate_transition(existing.status, change.status)?;

    let project = ProjectRepo::update_status(
        &state.pool,
        id,
        existing.status,
        change.status,
        change.notes.as_deref(),
    )
    .await?
    .ok_or_else(concurrent_status_change)?;

    tracing::info!(
        project_id = id,
        user_id = actor.id,
        from = %existing.status,
        to = %project.status,
        "Project status changed"
    );
    Ok(Json(DataResponse::new(project)))
}

fn concurrent_status_change() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Project status changed concurrently; reload and retry".into(),
    ))
}

/// PUT /api/v1/projects/{id}/budget
pub async fn update_budget(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<BudgetPayload>,
) -> AppResult<Json<DataResponse<Project>>> {
    let input = payload.into_update()?;
    let project = ProjectRepo::update_budget(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;

    tracing::info!(project_id = id, user_id = actor.id, "Project budget updated");
    Ok(Json(DataResponse::new(project)))
}

/// PUT /api/v1/projects/{id}/timeline
pub async fn update_timeline(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<TimelinePayload>,
) -> AppResult<Json<DataResponse<Project>>> {
    let input = payload.into_update()?;
    let project = ProjectRepo::update_timeline(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;

    tracing::info!(project_id = id, user_id = actor.id, "Project timeline updated");
    Ok(Json(DataResponse::new(project)))
}

/// DELETE /api/v1/projects/{id}
///
/// Owned rows go with the project; stored file blobs are removed afterwards
/// on a best-effort basis.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let blobs = ProjectRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;

    tracing::info!(project_id = id, user_id = actor.id, files = blobs.len(), "Project deleted");
    for blob in &blobs {
        delete_best_effort(state.blob_store.as_ref(), &blob.public_id, &blob.resource_type).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
