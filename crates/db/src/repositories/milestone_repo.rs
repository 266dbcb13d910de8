//! Repository for the `milestones` table.

use agency_core::types::DbId;
use sqlx::PgPool;

use crate::models::milestone::{Milestone, MilestoneInput};

/// Column list for `milestones` queries.
const COLUMNS: &str = "id, project_id, title, description, due_date, status, sort_order, \
    completed_at, created_at, updated_at";

/// Provides CRUD operations for project milestones.
pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Milestones of a project in display order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Milestone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM milestones WHERE project_id = $1 \
             ORDER BY sort_order ASC, due_date ASC"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE id = $1");
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &MilestoneInput,
    ) -> Result<Milestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO milestones (project_id, title, description, due_date, status, sort_order, \
                completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, \
                CASE WHEN $5 = 'COMPLETED' THEN NOW() ELSE NULL END) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_date)
            .bind(input.status.as_str())
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &MilestoneInput,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET title = $2, description = $3, due_date = $4, status = $5, \
                sort_order = $6, \
                completed_at = CASE WHEN $5 = 'COMPLETED' \
                    THEN COALESCE(completed_at, NOW()) ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_date)
            .bind(input.status.as_str())
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
