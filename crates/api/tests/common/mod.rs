//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use agency_api::auth::jwt::{generate_access_token, JwtConfig};
use agency_api::config::ServerConfig;
use agency_api::router::build_app_router;
use agency_api::state::AppState;
use agency_api::storage::BlobStoreConfig;
use agency_core::roles::Role;
use agency_core::storage::{BlobResourceType, BlobStore, BlobUpload, StorageError, StoredBlob};
use agency_core::types::DbId;
use agency_db::models::user::{NewUser, User};
use agency_db::repositories::UserRepo;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        blob_store: BlobStoreConfig {
            base_url: "http://blob-store.invalid".to_string(),
            api_key: None,
            timeout_secs: 5,
        },
    }
}

/// In-memory blob store that counts calls. Deletions can be made to fail.
#[derive(Default)]
pub struct FakeBlobStore {
    pub uploads: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_deletes: bool,
}

impl FakeBlobStore {
    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("{}/{}-{n}", upload.folder, upload.name);
        Ok(StoredBlob {
            url: format!("https://blobs.test/{public_id}"),
            public_id,
            bytes: upload.data.len() as i64,
        })
    }

    async fn delete(&self, _public_id: &str, _resource_type: BlobResourceType) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes {
            Err(StorageError::Status {
                status: 500,
                body: "storage unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_store(pool, Arc::new(FakeBlobStore::default()))
}

pub fn build_test_app_with_store(pool: PgPool, store: Arc<FakeBlobStore>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store: store,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, name: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &NewUser {
            name: Some(name.to_string()),
            email: format!("{name}@agency.test"),
            role,
            is_active: true,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub fn token_for(user_id: DbId, role: Role) -> String {
    generate_access_token(user_id, role, true, &test_config().jwt).expect("token should encode")
}

pub fn token(user: &User) -> String {
    token_for(user.id, user.role)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// POST a multipart form with text `fields` and an optional `file` part
/// given as `(file name, content type, bytes)`.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, Vec<u8>)>,
) -> Response<Body> {
    const BOUNDARY: &str = "agency-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
