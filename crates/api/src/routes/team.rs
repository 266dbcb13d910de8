//! Route definitions for teams and team memberships.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{team, team_member};
use crate::state::AppState;

/// Routes mounted at `/teams`.
///
/// ```text
/// GET    /                          -> list (admin)
/// POST   /                          -> create (admin)
/// GET    /managed                   -> managed (project manager)
/// PUT    /{id}                      -> update (admin)
/// DELETE /{id}                      -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(team::list).post(team::create))
        .route("/managed", get(team::managed))
        .route("/{id}", put(team::update).delete(team::delete))
}

/// Routes mounted at `/team-members`. Admins, or the team's lead.
///
/// ```text
/// POST   /                          -> add
/// PUT    /{id}/role                 -> set_role
/// DELETE /{id}                      -> remove
/// ```
pub fn member_router() -> Router<AppState> {
    Router::new()
        .route("/", post(team_member::add))
        .route("/{id}/role", put(team_member::set_role))
        .route("/{id}", delete(team_member::remove))
}
