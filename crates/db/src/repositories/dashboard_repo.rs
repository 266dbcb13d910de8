//! Read-only queries behind the project-manager dashboard.

use agency_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::dashboard::{ManagedProjectRow, ManagedTaskRow, MembershipRow};

/// Provides the independent reads the dashboard fold consumes.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Non-terminal projects managed by `manager_id` with task counts,
    /// soonest due first.
    pub async fn active_projects(
        pool: &PgPool,
        manager_id: DbId,
    ) -> Result<Vec<ManagedProjectRow>, sqlx::Error> {
        sqlx::query_as::<_, ManagedProjectRow>(
            "SELECT p.id, p.name, p.status, p.due_date, \
                (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS total_tasks, \
                (SELECT COUNT(*) FROM tasks t \
                 WHERE t.project_id = p.id AND t.status = 'COMPLETED') AS completed_tasks \
             FROM projects p \
             WHERE p.manager_id = $1 AND p.status IN ('PENDING', 'IN_PROGRESS', 'REVIEW') \
             ORDER BY p.due_date ASC NULLS LAST, p.id ASC",
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await
    }

    /// Every task on any project managed by `manager_id`.
    pub async fn managed_tasks(
        pool: &PgPool,
        manager_id: DbId,
    ) -> Result<Vec<ManagedTaskRow>, sqlx::Error> {
        sqlx::query_as::<_, ManagedTaskRow>(
            "SELECT t.assignee_id, t.status \
             FROM tasks t \
             JOIN projects p ON p.id = t.project_id \
             WHERE p.manager_id = $1",
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await
    }

    /// Active memberships of teams attached to projects managed by
    /// `manager_id`. A user on several such teams appears once per team.
    pub async fn team_memberships(
        pool: &PgPool,
        manager_id: DbId,
    ) -> Result<Vec<MembershipRow>, sqlx::Error> {
        sqlx::query_as::<_, MembershipRow>(
            "SELECT m.user_id, u.name, u.role \
             FROM team_members m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.is_active \
               AND m.team_id IN (SELECT p.team_id FROM projects p \
                                 WHERE p.manager_id = $1 AND p.team_id IS NOT NULL) \
             ORDER BY m.joined_at ASC",
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await
    }

    /// Projects managed by `manager_id` created in `[start, end)`.
    pub async fn projects_created_between(
        pool: &PgPool,
        manager_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects \
             WHERE manager_id = $1 AND created_at >= $2 AND created_at < $3",
        )
        .bind(manager_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }
}
