//! Route definitions for the `/projects` resource and its nested
//! team, milestone and timeline-event routes.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{milestone, project, project_team, timeline_event};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                          -> list (?include_archived, q, status, priority, client_id, manager_id)
/// POST   /                          -> create
/// GET    /form-options              -> form_options
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// PUT    /{id}/status               -> update_status
/// PUT    /{id}/budget               -> update_budget
/// PUT    /{id}/timeline             -> update_timeline
/// PUT    /{id}/team                 -> project_team::update_team
/// GET    /{id}/team-members         -> project_team::list_members
/// GET    /{id}/milestones           -> milestone::list
/// POST   /{id}/milestones           -> milestone::create
/// GET    /{id}/timeline-events      -> timeline_event::list
/// POST   /{id}/timeline-events      -> timeline_event::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/form-options", get(project::form_options))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/status", put(project::update_status))
        .route("/{id}/budget", put(project::update_budget))
        .route("/{id}/timeline", put(project::update_timeline))
        .route("/{id}/team", put(project_team::update_team))
        .route("/{id}/team-members", get(project_team::list_members))
        .route(
            "/{id}/milestones",
            get(milestone::list).post(milestone::create),
        )
        .route(
            "/{id}/timeline-events",
            get(timeline_event::list).post(timeline_event::create),
        )
}

/// Routes mounted at `/milestones`.
///
/// ```text
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// ```
pub fn milestone_router() -> Router<AppState> {
    Router::new().route("/{id}", put(milestone::update).delete(milestone::delete))
}

/// Routes mounted at `/timeline-events`.
///
/// ```text
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// ```
pub fn timeline_event_router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(timeline_event::update).delete(timeline_event::delete),
    )
}

