//! Blob storage port.
//!
//! The API crate supplies the HTTP implementation; tests supply fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Storage-side resource family of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobResourceType {
    Image,
    Video,
    Raw,
}

impl BlobResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlobResourceType::Image => "image",
            BlobResourceType::Video => "video",
            BlobResourceType::Raw => "raw",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(BlobResourceType::Image),
            "video" => Some(BlobResourceType::Video),
            "raw" => Some(BlobResourceType::Raw),
            _ => None,
        }
    }
}

/// A blob about to be stored.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub data: Vec<u8>,
    pub folder: String,
    pub name: String,
    pub content_type: String,
    pub resource_type: BlobResourceType,
}

/// What the store reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredBlob {
    pub url: String,
    pub public_id: String,
    pub bytes: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Blob storage request failed: {0}")]
    Request(String),

    #[error("Blob storage returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Blob storage response was malformed: {0}")]
    Malformed(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::ExternalService(err.to_string())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError>;

    async fn delete(&self, public_id: &str, resource_type: BlobResourceType) -> Result<(), StorageError>;
}
