//! Handlers for the `/files` resource.
//!
//! File rows are the source of truth; blobs are stored after validation and
//! removed best-effort when their row goes away.

use agency_core::access::{ensure_file_access, ResourceKind, ScopeFilter};
use agency_core::error::CoreError;
use agency_core::files::{
    classify, project_folder, resource_type_for, storage_name, validate_project_file,
};
use agency_core::storage::BlobUpload;
use agency_core::types::DbId;
use agency_db::models::file::{CreateFile, FileListItem, FileQuery, FileRecord};
use agency_db::repositories::FileRepo;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::project::project_relations;
use super::upload::read_form;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::delete_best_effort;

/// GET /api/v1/files?project_id=
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<FileQuery>,
) -> AppResult<Json<DataResponse<Vec<FileListItem>>>> {
    let scope = ScopeFilter::for_actor(&actor, ResourceKind::File)?;
    let files = FileRepo::list(&state.pool, &scope, query.project_id).await?;
    Ok(Json(DataResponse::new(files)))
}

/// POST /api/v1/files
///
/// Multipart form: `file` (at most 10 MB), `project_id`, and an optional
/// display `name` that defaults to the uploaded file name.
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<FileRecord>>)> {
    let mut form = read_form(multipart).await?;
    let project_id = form
        .field("project_id")
        .ok_or_else(|| CoreError::invalid_field("project_id", "Project is required"))?
        .parse::<DbId>()
        .map_err(|_| CoreError::invalid_field("project_id", "Project id must be a number"))?;
    let display_name = form.field("name").map(str::to_string);
    let file = form.require_file()?;
    validate_project_file(file.data.len())?;

    let relations = project_relations(&state.pool, project_id).await?;
    ensure_file_access(&actor, &relations, None)?;

    let name = display_name.unwrap_or_else(|| file.file_name.clone());
    let category = classify(&file.file_name, &file.content_type);
    let resource_type = resource_type_for(&file.content_type);
    let size = file.data.len() as i64;
    let stored = state
        .blob_store
        .upload(BlobUpload {
            name: storage_name(&file.file_name),
            folder: project_folder(project_id),
            content_type: file.content_type.clone(),
            resource_type,
            data: file.data,
        })
        .await?;

    let input = CreateFile {
        project_id,
        uploader_id: actor.id,
        name,
        url: stored.url,
        public_id: stored.public_id,
        resource_type: resource_type.as_str().to_string(),
        category: category.as_str().to_string(),
        size,
        mime_type: file.content_type,
    };
    let record = match FileRepo::create(&state.pool, &input).await {
        Ok(record) => record,
        Err(e) => {
            delete_best_effort(state.blob_store.as_ref(), &input.public_id, &input.resource_type)
                .await;
            return Err(e.into());
        }
    };

    tracing::info!(
        file_id = record.id,
        project_id,
        user_id = actor.id,
        size = record.size,
        category = %record.category,
        "File uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(record))))
}

/// DELETE /api/v1/files/{id}
///
/// Succeeds once the row is gone, even if the blob cannot be removed.
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let file = FileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("File", id))?;
    let relations = project_relations(&state.pool, file.project_id).await?;
    ensure_file_access(&actor, &relations, Some(file.uploader_id))?;

    if !FileRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("File", id));
    }
    delete_best_effort(state.blob_store.as_ref(), &file.public_id, &file.resource_type).await;

    tracing::info!(file_id = id, project_id = file.project_id, user_id = actor.id, "File deleted");
    Ok(StatusCode::NO_CONTENT)
}
