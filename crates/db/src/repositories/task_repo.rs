//! Repository for the `tasks` table.

use agency_core::access::ScopeFilter;
use agency_core::types::DbId;
use sqlx::PgPool;

use crate::filter::{bind_values, WhereBuilder};
use crate::models::task::{Task, TaskInput, TaskListItem};

/// Column list for `tasks` queries.
const COLUMNS: &str = "id, project_id, assignee_id, creator_id, title, description, status, \
    priority, deadline, estimated_hours, actual_hours, completed_at, created_at, updated_at";

/// Listing projection with project, assignee and creator names.
const LIST_SELECT: &str = "SELECT t.id, t.project_id, t.assignee_id, t.creator_id, t.title, \
    t.description, t.status, t.priority, t.deadline, t.estimated_hours, t.actual_hours, \
    t.completed_at, t.created_at, t.updated_at, \
    p.name AS project_name, a.name AS assignee_name, c.name AS creator_name \
    FROM tasks t \
    JOIN projects p ON p.id = t.project_id \
    LEFT JOIN users a ON a.id = t.assignee_id \
    LEFT JOIN users c ON c.id = t.creator_id";

/// Stamp `completed_at` on entering COMPLETED, keep it while completed,
/// clear it otherwise. `$n` is the new status placeholder.
fn completed_at_expr(status_placeholder: &str, current: &str) -> String {
    format!(
        "CASE WHEN {status_placeholder} = 'COMPLETED' THEN COALESCE({current}, NOW()) ELSE NULL END"
    )
}

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Tasks visible under `scope`, newest first. Optionally limited to one
    /// project.
    pub async fn list(
        pool: &PgPool,
        scope: &ScopeFilter,
        project_id: Option<DbId>,
    ) -> Result<Vec<TaskListItem>, sqlx::Error> {
        let mut w = WhereBuilder::new();
        w.push_scope(scope, "p", None);
        w.push_eq_id("t.project_id", project_id);
        let query = format!("{LIST_SELECT} {} ORDER BY t.created_at DESC", w.where_clause());
        let q = sqlx::query_as::<_, TaskListItem>(&query);
        bind_values(q, w.binds()).fetch_all(pool).await
    }

    /// All tasks of one project, for the project detail view.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TaskListItem>, sqlx::Error> {
        let query = format!("{LIST_SELECT} WHERE t.project_id = $1 ORDER BY t.created_at DESC");
        sqlx::query_as::<_, TaskListItem>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_item(pool: &PgPool, id: DbId) -> Result<Option<TaskListItem>, sqlx::Error> {
        let query = format!("{LIST_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, TaskListItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &TaskInput,
    ) -> Result<Task, sqlx::Error> {
        let completed_at = completed_at_expr("$5", "NULL::timestamptz");
        let query = format!(
            "INSERT INTO tasks (project_id, assignee_id, creator_id, title, status, priority, \
                description, deadline, estimated_hours, actual_hours, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, {completed_at}) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(input.assignee_id)
            .bind(creator_id)
            .bind(&input.title)
            .bind(input.status.as_str())
            .bind(input.priority.as_str())
            .bind(&input.description)
            .bind(input.deadline)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .fetch_one(pool)
            .await
    }

    /// Replace a task's editable fields.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &TaskInput,
    ) -> Result<Option<Task>, sqlx::Error> {
        let completed_at = completed_at_expr("$5", "completed_at");
        let query = format!(
            "UPDATE tasks SET project_id = $2, assignee_id = $3, title = $4, status = $5, \
                priority = $6, description = $7, deadline = $8, estimated_hours = $9, \
                actual_hours = $10, completed_at = {completed_at}, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(input.assignee_id)
            .bind(&input.title)
            .bind(input.status.as_str())
            .bind(input.priority.as_str())
            .bind(&input.description)
            .bind(input.deadline)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_stamp_preserves_existing_value() {
        let expr = completed_at_expr("$5", "completed_at");
        assert_eq!(
            expr,
            "CASE WHEN $5 = 'COMPLETED' THEN COALESCE(completed_at, NOW()) ELSE NULL END"
        );
    }
}
