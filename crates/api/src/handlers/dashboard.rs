//! Handler for the project-manager dashboard.

use agency_core::dashboard::{summarize, DashboardInputs, ManagerDashboard};
use agency_core::error::CoreError;
use agency_core::progress::month_window;
use agency_db::repositories::{DashboardRepo, InvoiceRepo};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireProjectManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/project-manager
///
/// All reads run concurrently and the fold only runs if every one of them
/// succeeded; any failure yields `DASHBOARD_UNAVAILABLE`.
pub async fn project_manager(
    State(state): State<AppState>,
    RequireProjectManager(actor): RequireProjectManager,
) -> AppResult<Json<DataResponse<ManagerDashboard>>> {
    let pool = &state.pool;
    let now = chrono::Utc::now();
    let (this_month_start, this_month_end) = month_window(now, 0);
    let (last_month_start, last_month_end) = month_window(now, 1);

    let fetched = tokio::try_join!(
        DashboardRepo::active_projects(pool, actor.id),
        DashboardRepo::managed_tasks(pool, actor.id),
        DashboardRepo::team_memberships(pool, actor.id),
        InvoiceRepo::revenue_between(pool, actor.id, this_month_start, this_month_end),
        InvoiceRepo::revenue_between(pool, actor.id, last_month_start, last_month_end),
        DashboardRepo::projects_created_between(pool, actor.id, last_month_start, last_month_end),
    );
    let (projects, tasks, memberships, current_revenue, previous_revenue, last_month_new_projects) =
        fetched.map_err(|e| {
            tracing::error!(user_id = actor.id, error = %e, "Dashboard query failed");
            CoreError::DashboardUnavailable
        })?;

    let dashboard = summarize(
        DashboardInputs {
            projects: projects.into_iter().map(Into::into).collect(),
            tasks: tasks.into_iter().map(Into::into).collect(),
            memberships: memberships.into_iter().map(Into::into).collect(),
            current_revenue,
            previous_revenue,
            last_month_new_projects,
        },
        now,
    );
    Ok(Json(DataResponse::new(dashboard)))
}
