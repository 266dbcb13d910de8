pub mod file;
pub mod health;
pub mod invoice;
pub mod project;
pub mod task;
pub mod team;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                    list, create
/// /projects/form-options                       client, manager and team choices
/// /projects/{id}                               detail, update, delete
/// /projects/{id}/status                        status transition (PUT)
/// /projects/{id}/budget                        budget (PUT)
/// /projects/{id}/timeline                      dates and estimate (PUT)
/// /projects/{id}/team                          team action (PUT)
/// /projects/{id}/team-members                  active roster
/// /projects/{id}/milestones                    list, create
/// /projects/{id}/timeline-events               list, create
///
/// /milestones/{id}                             update, delete
/// /timeline-events/{id}                        update, delete
///
/// /tasks                                       list, create
/// /tasks/{id}                                  get, update, delete
///
/// /invoices                                    list (?role), create
/// /invoices/{id}                               update, delete
/// /invoices/{id}/receipt                       receipt upload (POST, multipart)
///
/// /files                                       list, upload (multipart)
/// /files/{id}                                  delete
///
/// /teams                                       list, create (admin)
/// /teams/managed                               members of led teams (project manager)
/// /teams/{id}                                  update, delete (admin)
///
/// /team-members                                add (admin or team lead)
/// /team-members/{id}/role                      change role
/// /team-members/{id}                           remove
///
/// /users/assignable                            assignable users
///
/// /dashboard/project-manager                   project-manager dashboard
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/milestones", project::milestone_router())
        .nest("/timeline-events", project::timeline_event_router())
        .nest("/tasks", task::router())
        .nest("/invoices", invoice::router())
        .nest("/files", file::router())
        .nest("/teams", team::router())
        .nest("/team-members", team::member_router())
        .route("/users/assignable", get(handlers::user::assignable))
        .route(
            "/dashboard/project-manager",
            get(handlers::dashboard::project_manager),
        )
}
