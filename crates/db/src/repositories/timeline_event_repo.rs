//! Repository for the `timeline_events` table.

use agency_core::types::DbId;
use sqlx::PgPool;

use crate::models::timeline_event::{TimelineEvent, TimelineEventInput};

/// Column list for `timeline_events` queries.
const COLUMNS: &str =
    "id, project_id, title, description, event_type, event_date, created_by, created_at";

/// Provides CRUD operations for project timeline events.
pub struct TimelineEventRepo;

impl TimelineEventRepo {
    /// Events of a project in chronological order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_events WHERE project_id = $1 ORDER BY event_date ASC"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_events WHERE id = $1");
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &TimelineEventInput,
    ) -> Result<TimelineEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_events (project_id, title, description, event_type, event_date, \
                created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.event_type)
            .bind(input.event_date)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &TimelineEventInput,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_events SET title = $2, description = $3, event_type = $4, \
                event_date = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.event_type)
            .bind(input.event_date)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timeline_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
