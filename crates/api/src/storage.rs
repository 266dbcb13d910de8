//! HTTP client for the external blob storage service.
//!
//! Uploads are multipart `POST {base}/upload`; deletions are
//! `POST {base}/destroy` with a JSON body. Both authenticate with an
//! optional bearer API key.

use std::time::Duration;

use agency_core::storage::{BlobResourceType, BlobStore, BlobUpload, StorageError, StoredBlob};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

/// Default per-request timeout for storage calls.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the blob storage service.
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl BlobStoreConfig {
    /// Load from the environment.
    ///
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `BLOB_STORE_URL`          | **yes**  | --      |
    /// | `BLOB_STORE_API_KEY`      | no       | --      |
    /// | `BLOB_STORE_TIMEOUT_SECS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `BLOB_STORE_URL` is not set.
    pub fn from_env() -> Self {
        let base_url = std::env::var("BLOB_STORE_URL").expect("BLOB_STORE_URL must be set");
        let api_key = std::env::var("BLOB_STORE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let timeout_secs: u64 = std::env::var("BLOB_STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("BLOB_STORE_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
        }
    }
}

/// [`BlobStore`] backed by the storage service's HTTP API.
pub struct HttpBlobStore {
    client: reqwest::Client,
    config: BlobStoreConfig,
}

impl HttpBlobStore {
    pub fn new(config: BlobStoreConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Return the response unchanged on success, or the status and body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let file = Part::bytes(upload.data)
            .file_name(upload.name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| StorageError::Request(e.to_string()))?;
        let form = Form::new()
            .text("folder", upload.folder)
            .text("public_id", upload.name)
            .text("resource_type", upload.resource_type.as_str())
            .part("file", file);

        let request = self
            .client
            .post(format!("{}/upload", self.config.base_url))
            .multipart(form);
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        Self::ensure_success(response)
            .await?
            .json::<StoredBlob>()
            .await
            .map_err(|e| StorageError::Malformed(e.to_string()))
    }

    async fn delete(
        &self,
        public_id: &str,
        resource_type: BlobResourceType,
    ) -> Result<(), StorageError> {
        let request = self
            .client
            .post(format!("{}/destroy", self.config.base_url))
            .json(&serde_json::json!({
                "public_id": public_id,
                "resource_type": resource_type.as_str(),
            }));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Delete a blob, logging instead of failing.
///
/// Metadata is the source of truth; an orphaned blob is only wasted space.
pub async fn delete_best_effort(store: &dyn BlobStore, public_id: &str, resource_type: &str) {
    let resource_type = BlobResourceType::parse(resource_type).unwrap_or(BlobResourceType::Raw);
    if let Err(e) = store.delete(public_id, resource_type).await {
        tracing::warn!(public_id, error = %e, "Failed to delete blob, leaving it orphaned");
    }
}
