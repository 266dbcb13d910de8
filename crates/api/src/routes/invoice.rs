//! Route definitions for the `/invoices` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::invoice;
use crate::handlers::upload::upload_body_limit;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET    /                          -> list (?role)
/// POST   /                          -> create
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// POST   /{id}/receipt              -> upload_receipt (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invoice::list).post(invoice::create))
        .route("/{id}", put(invoice::update).delete(invoice::delete))
        .route(
            "/{id}/receipt",
            post(invoice::upload_receipt).layer(DefaultBodyLimit::max(upload_body_limit())),
        )
}
