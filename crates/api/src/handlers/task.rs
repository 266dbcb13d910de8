//! Handlers for the `/tasks` resource.

use agency_core::access::{ResourceKind, ScopeFilter};
use agency_core::error::CoreError;
use agency_core::types::DbId;
use agency_db::models::task::{Task, TaskListItem, TaskPayload};
use agency_db::repositories::{ProjectRepo, TaskRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::project::project_relations;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub project_id: Option<DbId>,
}

/// GET /api/v1/tasks
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<TaskQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskListItem>>>> {
    let scope = ScopeFilter::for_actor(&actor, ResourceKind::Task)?;
    let tasks = TaskRepo::list(&state.pool, &scope, query.project_id).await?;
    Ok(Json(DataResponse::new(tasks)))
}

/// GET /api/v1/tasks/{id}
///
/// Visible to whoever the task listing would show it to.
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskListItem>>> {
    let task = TaskRepo::find_item(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;

    let scope = ScopeFilter::for_actor(&actor, ResourceKind::Task)?;
    let relations = project_relations(&state.pool, task.task.project_id).await?;
    if !scope.matches(&relations) {
        return Err(CoreError::access_denied("You do not have access to this task").into());
    }
    Ok(Json(DataResponse::new(task)))
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Json(payload): Json<TaskPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    let input = payload.into_input()?;
    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", input.project_id))?;

    let task = TaskRepo::create(&state.pool, actor.id, &input).await?;
    tracing::info!(
        task_id = task.id,
        project_id = task.project_id,
        user_id = actor.id,
        "Task created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(task))))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<TaskPayload>,
) -> AppResult<Json<DataResponse<Task>>> {
    let input = payload.into_input()?;
    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;

    tracing::info!(task_id = id, status = %task.status, user_id = actor.id, "Task updated");
    Ok(Json(DataResponse::new(task)))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Task", id));
    }
    tracing::info!(task_id = id, user_id = actor.id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
