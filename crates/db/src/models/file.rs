//! File metadata model.

use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `files` table. The blob itself lives in external storage.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileRecord {
    pub id: DbId,
    pub project_id: DbId,
    pub uploader_id: DbId,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing)]
    pub public_id: String,
    #[serde(skip_serializing)]
    pub resource_type: String,
    /// Display category, e.g. `PDF` or `Image`.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub category: String,
    pub size: i64,
    pub mime_type: String,
    pub created_at: Timestamp,
}

/// A file with its project and uploader names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub file: FileRecord,
    pub project_name: String,
    pub uploader_name: Option<String>,
}

/// Query-string for `GET /files`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileQuery {
    pub project_id: Option<DbId>,
}

/// Metadata for a blob that has already been stored.
#[derive(Debug, Clone)]
pub struct CreateFile {
    pub project_id: DbId,
    pub uploader_id: DbId,
    pub name: String,
    pub url: String,
    pub public_id: String,
    pub resource_type: String,
    pub category: String,
    pub size: i64,
    pub mime_type: String,
}

/// Just enough to remove a blob after its row is gone.
#[derive(Debug, Clone, FromRow)]
pub struct BlobRef {
    pub public_id: String,
    pub resource_type: String,
}
