//! Handlers for the `/invoices` resource.

use agency_core::access::invoice_scope;
use agency_core::files::{resource_type_for, storage_name, validate_receipt, RECEIPT_FOLDER};
use agency_core::storage::BlobUpload;
use agency_core::types::DbId;
use agency_db::models::invoice::{Invoice, InvoiceListItem, InvoicePayload, InvoiceQuery};
use agency_db::repositories::InvoiceRepo;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::upload::read_form;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::delete_best_effort;

/// GET /api/v1/invoices?role=
///
/// `role` defaults to the caller's own role.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<DataResponse<Vec<InvoiceListItem>>>> {
    let scope = invoice_scope(&actor, query.role.as_deref())?;
    let invoices = InvoiceRepo::list(&state.pool, &scope).await?;
    Ok(Json(DataResponse::new(invoices)))
}

/// POST /api/v1/invoices
pub async fn create(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Json(payload): Json<InvoicePayload>,
) -> AppResult<(StatusCode, Json<DataResponse<Invoice>>)> {
    let input = payload.into_input()?;
    let invoice = InvoiceRepo::create(&state.pool, &input).await?;

    tracing::info!(
        invoice_id = invoice.id,
        project_id = invoice.project_id,
        amount = invoice.amount,
        user_id = actor.id,
        "Invoice created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(invoice))))
}

/// PUT /api/v1/invoices/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    Json(payload): Json<InvoicePayload>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let input = payload.into_input()?;
    let invoice = InvoiceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", id))?;

    tracing::info!(invoice_id = id, status = %invoice.status, user_id = actor.id, "Invoice updated");
    Ok(Json(DataResponse::new(invoice)))
}

/// DELETE /api/v1/invoices/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !InvoiceRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Invoice", id));
    }
    tracing::info!(invoice_id = id, user_id = actor.id, "Invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/invoices/{id}/receipt
///
/// Multipart form with a `file` part (JPEG, PNG or PDF, at most 5 MB).
/// The file is validated before the invoice is looked up or anything is
/// sent to storage.
pub async fn upload_receipt(
    State(state): State<AppState>,
    RequireManager(actor): RequireManager,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let mut form = read_form(multipart).await?;
    let file = form.require_file()?;
    validate_receipt(&file.file_name, &file.content_type, file.data.len())?;

    InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", id))?;

    let resource_type = resource_type_for(&file.content_type);
    let stored = state
        .blob_store
        .upload(BlobUpload {
            name: storage_name(&file.file_name),
            folder: RECEIPT_FOLDER.to_string(),
            content_type: file.content_type,
            resource_type,
            data: file.data,
        })
        .await?;

    let invoice = match InvoiceRepo::set_receipt(&state.pool, id, &stored.url, &stored.public_id).await {
        Ok(Some(invoice)) => invoice,
        Ok(None) => {
            delete_best_effort(state.blob_store.as_ref(), &stored.public_id, resource_type.as_str())
                .await;
            return Err(AppError::not_found("Invoice", id));
        }
        Err(e) => {
            delete_best_effort(state.blob_store.as_ref(), &stored.public_id, resource_type.as_str())
                .await;
            return Err(e.into());
        }
    };

    tracing::info!(invoice_id = id, user_id = actor.id, bytes = stored.bytes, "Invoice receipt uploaded");
    Ok(Json(DataResponse::new(invoice)))
}
