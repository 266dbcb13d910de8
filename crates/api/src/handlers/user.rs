//! Handlers for the `/users` resource. Accounts themselves are managed by
//! the identity provider.

use agency_core::roles::Role;
use agency_db::models::user::UserSummary;
use agency_db::repositories::UserRepo;
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/assignable
///
/// Active team members and project managers, for task and team pickers.
pub async fn assignable(
    State(state): State<AppState>,
    RequireManager(_actor): RequireManager,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    let users =
        UserRepo::list_active_by_roles(&state.pool, &[Role::TeamMember, Role::ProjectManager])
            .await?;
    Ok(Json(DataResponse::new(users)))
}
