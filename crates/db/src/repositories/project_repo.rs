//! Repository for the `projects` table and its read-path joins.

use agency_core::access::{ProjectRelations, ScopeFilter};
use agency_core::search::SEARCH_RESULT_LIMIT;
use agency_core::status::{ProjectStatus, TeamRole};
use agency_core::types::DbId;
use sqlx::PgPool;

use crate::filter::{bind_values, BindValue, WhereBuilder};
use crate::models::file::BlobRef;
use crate::models::project::{
    BudgetUpdate, CreateProject, Project, ProjectFilters, ProjectSummaryRow, TimelineUpdate,
    UpdateProject,
};
use crate::repositories::team_member_repo::TeamMemberRepo;

/// Column list for `projects` queries.
const COLUMNS: &str = "id, name, description, client_id, manager_id, team_id, status, priority, \
    budget, spent_amount, currency, start_date, due_date, estimated_hours, actual_hours, \
    tags, notes, created_at, updated_at";

/// Summary projection: project columns plus joined names and child counts.
const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.description, p.client_id, p.manager_id, \
    p.team_id, p.status, p.priority, p.budget, p.spent_amount, p.currency, p.start_date, \
    p.due_date, p.estimated_hours, p.actual_hours, p.tags, p.notes, p.created_at, p.updated_at, \
    c.name AS client_name, m.name AS manager_name, tm.name AS team_name, \
    (SELECT COUNT(*) FROM tasks x WHERE x.project_id = p.id) AS task_count, \
    (SELECT COUNT(*) FROM tasks x WHERE x.project_id = p.id AND x.status = 'COMPLETED') \
        AS completed_task_count, \
    (SELECT COUNT(*) FROM files x WHERE x.project_id = p.id) AS file_count, \
    (SELECT COUNT(*) FROM invoices x WHERE x.project_id = p.id) AS invoice_count \
    FROM projects p \
    LEFT JOIN users c ON c.id = p.client_id \
    LEFT JOIN users m ON m.id = p.manager_id \
    LEFT JOIN teams tm ON tm.id = p.team_id";

/// Provides CRUD and scoped listing for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// List projects visible under `scope`, narrowed by `filters`.
    ///
    /// Archived projects are hidden unless requested explicitly or by status.
    /// Any filter switches to search mode: most recently updated first,
    /// capped at [`SEARCH_RESULT_LIMIT`].
    pub async fn list(
        pool: &PgPool,
        scope: &ScopeFilter,
        filters: &ProjectFilters,
    ) -> Result<Vec<ProjectSummaryRow>, sqlx::Error> {
        let mut w = WhereBuilder::new();
        w.push_scope(scope, "p", None);
        if !filters.include_archived && filters.status != Some(ProjectStatus::Archived) {
            w.push("p.status <> 'ARCHIVED'");
        }
        w.push_eq_text("p.status", filters.status.map(|s| s.as_str()));
        w.push_eq_text("p.priority", filters.priority.map(|p| p.as_str()));
        w.push_eq_id("p.client_id", filters.client_id);
        w.push_eq_id("p.manager_id", filters.manager_id);
        if let Some(pattern) = &filters.text_pattern {
            let p = w.bind(BindValue::Text(pattern.clone()));
            w.push(format!(
                "(p.name ILIKE {p} OR p.description ILIKE {p} OR COALESCE(p.tags, '') ILIKE {p})"
            ));
        }

        let tail = if filters.is_search() {
            format!("ORDER BY p.updated_at DESC LIMIT {SEARCH_RESULT_LIMIT}")
        } else {
            "ORDER BY p.created_at DESC".to_string()
        };
        let query = format!("{SUMMARY_SELECT} {} {tail}", w.where_clause());
        let q = sqlx::query_as::<_, ProjectSummaryRow>(&query);
        bind_values(q, w.binds()).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A single project with names and counts.
    pub async fn find_summary(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectSummaryRow>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProjectSummaryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The relations access decisions are made from. `None` if the project
    /// does not exist.
    pub async fn relations(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectRelations>, sqlx::Error> {
        let row = sqlx::query_as::<_, (DbId, DbId, Vec<DbId>, Vec<DbId>)>(
            "SELECT p.client_id, p.manager_id, \
                ARRAY(SELECT tm.user_id FROM team_members tm \
                      WHERE tm.team_id = p.team_id AND tm.is_active) AS team_member_ids, \
                ARRAY(SELECT DISTINCT t.assignee_id FROM tasks t \
                      WHERE t.project_id = p.id AND t.assignee_id IS NOT NULL) AS assignee_ids \
             FROM projects p WHERE p.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(
            |(client_id, manager_id, team_member_ids, assignee_ids)| ProjectRelations {
                client_id,
                manager_id,
                team_member_ids,
                assignee_ids,
            },
        ))
    }

    pub async fn message_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE project_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, client_id, manager_id, team_id, status, \
                priority, budget, spent_amount, currency, start_date, due_date, estimated_hours, \
                actual_hours, tags, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.client_id)
            .bind(input.manager_id)
            .bind(input.team_id)
            .bind(input.status.as_str())
            .bind(input.priority.as_str())
            .bind(input.budget)
            .bind(input.spent_amount)
            .bind(&input.currency)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .bind(&input.tags)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Only `Some` fields change.
    ///
    /// With `expected_status` set, the row is only written while it still has
    /// that status; otherwise `None` is returned, as in [`Self::update_status`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
        expected_status: Option<ProjectStatus>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                client_id = COALESCE($4, client_id), \
                manager_id = COALESCE($5, manager_id), \
                team_id = COALESCE($6, team_id), \
                status = COALESCE($7, status), \
                priority = COALESCE($8, priority), \
                budget = COALESCE($9, budget), \
                spent_amount = COALESCE($10, spent_amount), \
                currency = COALESCE($11, currency), \
                start_date = COALESCE($12, start_date), \
                due_date = COALESCE($13, due_date), \
                estimated_hours = COALESCE($14, estimated_hours), \
                actual_hours = COALESCE($15, actual_hours), \
                tags = COALESCE($16, tags), \
                notes = COALESCE($17, notes), \
                updated_at = NOW() \
             WHERE id = $1 AND ($18::TEXT IS NULL OR status = $18) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.client_id)
            .bind(input.manager_id)
            .bind(input.team_id)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.budget)
            .bind(input.spent_amount)
            .bind(&input.currency)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .bind(&input.tags)
            .bind(&input.notes)
            .bind(expected_status.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Move a project from `current` to `next`.
    ///
    /// Returns `None` when the project no longer has status `current`, so a
    /// concurrent change is never overwritten with an unchecked transition.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        current: ProjectStatus,
        next: ProjectStatus,
        notes: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status = $3, notes = COALESCE($4, notes), updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(current.as_str())
            .bind(next.as_str())
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_budget(
        pool: &PgPool,
        id: DbId,
        input: &BudgetUpdate,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET budget = $2, spent_amount = $3, currency = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.budget)
            .bind(input.spent_amount)
            .bind(&input.currency)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_timeline(
        pool: &PgPool,
        id: DbId,
        input: &TimelineUpdate,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET start_date = $2, due_date = $3, estimated_hours = $4, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project and everything it owns.
    ///
    /// Returns the stored blobs of the deleted files so the caller can remove
    /// them from storage, or `None` if the project did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Vec<BlobRef>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let blobs = sqlx::query_as::<_, BlobRef>(
            "SELECT public_id, resource_type FROM files WHERE project_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(blobs))
    }

    /// Return the project's team, creating `"<name> Team"` led by the
    /// project manager when it has none.
    pub async fn ensure_team(pool: &PgPool, project: &Project) -> Result<DbId, sqlx::Error> {
        if let Some(team_id) = project.team_id {
            return Ok(team_id);
        }
        let mut tx = pool.begin().await?;

        // Lock the row so concurrent callers agree on one team.
        let existing = sqlx::query_scalar::<_, Option<DbId>>(
            "SELECT team_id FROM projects WHERE id = $1 FOR UPDATE",
        )
        .bind(project.id)
        .fetch_one(&mut *tx)
        .await?;
        if let Some(team_id) = existing {
            tx.commit().await?;
            return Ok(team_id);
        }

        let team_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO teams (name, description, team_lead_id) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(format!("{} Team", project.name))
        .bind(format!("Team for {} project", project.name))
        .bind(project.manager_id)
        .fetch_one(&mut *tx)
        .await?;

        TeamMemberRepo::upsert_in(&mut *tx, team_id, project.manager_id, TeamRole::Lead).await?;

        sqlx::query("UPDATE projects SET team_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(project.id)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(project_id = project.id, team_id, "Created project team");
        Ok(team_id)
    }
}
