//! Route definitions for the `/files` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::file;
use crate::handlers::upload::upload_body_limit;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// GET    /                          -> list (?project_id)
/// POST   /                          -> upload (multipart)
/// DELETE /{id}                      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(file::list).post(file::upload).layer(DefaultBodyLimit::max(upload_body_limit())),
        )
        .route("/{id}", delete(file::delete))
}
