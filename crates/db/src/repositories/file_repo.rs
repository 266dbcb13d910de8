//! Repository for the `files` table.

use agency_core::access::ScopeFilter;
use agency_core::types::DbId;
use sqlx::PgPool;

use crate::filter::{bind_values, WhereBuilder};
use crate::models::file::{CreateFile, FileListItem, FileRecord};

/// Column list for `files` queries.
const COLUMNS: &str =
    "id, project_id, uploader_id, name, url, public_id, resource_type, type, size, mime_type, created_at";

const LIST_SELECT: &str = "SELECT f.id, f.project_id, f.uploader_id, f.name, f.url, f.public_id, \
    f.resource_type, f.type, f.size, f.mime_type, f.created_at, \
    p.name AS project_name, u.name AS uploader_name \
    FROM files f \
    JOIN projects p ON p.id = f.project_id \
    LEFT JOIN users u ON u.id = f.uploader_id";

/// Provides metadata CRUD for uploaded files.
pub struct FileRepo;

impl FileRepo {
    /// Files visible under `scope`, newest first.
    pub async fn list(
        pool: &PgPool,
        scope: &ScopeFilter,
        project_id: Option<DbId>,
    ) -> Result<Vec<FileListItem>, sqlx::Error> {
        let mut w = WhereBuilder::new();
        w.push_scope(scope, "p", None);
        w.push_eq_id("f.project_id", project_id);
        let query = format!("{LIST_SELECT} {} ORDER BY f.created_at DESC", w.where_clause());
        let q = sqlx::query_as::<_, FileListItem>(&query);
        bind_values(q, w.binds()).fetch_all(pool).await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<FileRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM files WHERE project_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, FileRecord>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FileRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM files WHERE id = $1");
        sqlx::query_as::<_, FileRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateFile) -> Result<FileRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO files (project_id, uploader_id, name, url, public_id, resource_type, \
                type, size, mime_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FileRecord>(&query)
            .bind(input.project_id)
            .bind(input.uploader_id)
            .bind(&input.name)
            .bind(&input.url)
            .bind(&input.public_id)
            .bind(&input.resource_type)
            .bind(&input.category)
            .bind(input.size)
            .bind(&input.mime_type)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
