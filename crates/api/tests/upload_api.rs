//! Receipt and project-file uploads against an in-memory blob store.

mod common;

use std::sync::Arc;

use agency_core::roles::Role;
use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, post_multipart_auth, put_json_auth, seed_user,
    token, FakeBlobStore,
};
use serde_json::{json, Value};
use sqlx::PgPool;

const MB: usize = 1024 * 1024;

struct World {
    manager_token: String,
    client_token: String,
    client_id: i64,
    project_id: i64,
}

async fn world(pool: &PgPool, app: axum::Router) -> World {
    let manager = seed_user(pool, "manager", Role::ProjectManager).await;
    let client = seed_user(pool, "client", Role::Client).await;
    let body = json!({
        "name": "Acme Website",
        "description": "Marketing site rebuild",
        "client_id": client.id,
        "budget": 1000,
        "due_date": "2030-06-01",
    });
    let response = post_json_auth(app, "/api/v1/projects", &token(&manager), body).await;
    let project: Value = body_json(response).await["data"].clone();
    World {
        manager_token: token(&manager),
        client_token: token(&client),
        client_id: client.id,
        project_id: project["id"].as_i64().unwrap(),
    }
}

async fn create_invoice(app: axum::Router, w: &World) -> i64 {
    let body = json!({
        "project_id": w.project_id,
        "client_id": w.client_id,
        "amount": "250.00",
        "due_date": "2030-07-01",
    });
    let response = post_json_auth(app, "/api/v1/invoices", &w.manager_token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_receipt_never_reaches_storage(pool: PgPool) {
    let store = Arc::new(FakeBlobStore::default());
    let app = common::build_test_app_with_store(pool.clone(), store.clone());
    let w = world(&pool, app.clone()).await;
    let invoice_id = create_invoice(app.clone(), &w).await;

    let uri = format!("/api/v1/invoices/{invoice_id}/receipt");
    let response = post_multipart_auth(
        app,
        &uri,
        &w.manager_token,
        &[],
        Some(("receipt.pdf", "application/pdf", vec![0u8; 6 * MB])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(store.upload_count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn executable_receipt_is_rejected(pool: PgPool) {
    let store = Arc::new(FakeBlobStore::default());
    let app = common::build_test_app_with_store(pool.clone(), store.clone());
    let w = world(&pool, app.clone()).await;

    // Validation runs before the invoice lookup, so any id will do.
    let response = post_multipart_auth(
        app,
        "/api/v1/invoices/424242/receipt",
        &w.manager_token,
        &[],
        Some(("setup.exe", "application/octet-stream", vec![1u8; 1024])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.upload_count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_receipt_is_stored_and_linked(pool: PgPool) {
    let store = Arc::new(FakeBlobStore::default());
    let app = common::build_test_app_with_store(pool.clone(), store.clone());
    let w = world(&pool, app.clone()).await;
    let invoice_id = create_invoice(app.clone(), &w).await;

    let uri = format!("/api/v1/invoices/{invoice_id}/receipt");
    let response = post_multipart_auth(
        app.clone(),
        &uri,
        &w.manager_token,
        &[],
        Some(("receipt.png", "image/png", vec![7u8; 2048])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let invoice = body_json(response).await["data"].clone();
    assert_eq!(invoice["receipt_url"], "https://blobs.test/receipts/receipt-1");
    assert!(invoice.get("receipt_public_id").is_none());
    assert_eq!(store.upload_count(), 1);

    let response = post_multipart_auth(
        app,
        &uri,
        &w.client_token,
        &[],
        Some(("receipt.png", "image/png", vec![7u8; 2048])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Project files
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn file_upload_is_classified_and_sized(pool: PgPool) {
    let store = Arc::new(FakeBlobStore::default());
    let app = common::build_test_app_with_store(pool.clone(), store.clone());
    let w = world(&pool, app.clone()).await;
    let project_id = w.project_id.to_string();

    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/files",
        &w.client_token,
        &[("project_id", &project_id), ("name", "Brand guidelines")],
        Some(("guidelines.pdf", "application/pdf", vec![1u8; 4096])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let file = body_json(response).await["data"].clone();
    assert_eq!(file["name"], "Brand guidelines");
    assert_eq!(file["type"], "PDF");
    assert_eq!(file["size"], 4096);

    let response = post_multipart_auth(
        app,
        "/api/v1/files",
        &w.client_token,
        &[("project_id", &project_id)],
        Some(("huge.zip", "application/zip", vec![0u8; 10 * MB + 1])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.upload_count(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn file_delete_survives_storage_failure(pool: PgPool) {
    let store = Arc::new(FakeBlobStore::failing_deletes());
    let app = common::build_test_app_with_store(pool.clone(), store.clone());
    let w = world(&pool, app.clone()).await;
    let project_id = w.project_id.to_string();

    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/files",
        &w.manager_token,
        &[("project_id", &project_id)],
        Some(("logo.png", "image/png", vec![1u8; 512])),
    )
    .await;
    let file_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/files/{file_id}"), &w.manager_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.delete_count(), 1);

    let uri = format!("/api/v1/files?project_id={}", w.project_id);
    let response = get_auth(app, &uri, &w.manager_token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn uploader_keeps_delete_access_after_leaving_team(pool: PgPool) {
    let store = Arc::new(FakeBlobStore::default());
    let app = common::build_test_app_with_store(pool.clone(), store.clone());
    let w = world(&pool, app.clone()).await;
    let uploader = seed_user(&pool, "uploader", Role::TeamMember).await;
    let stranger = seed_user(&pool, "stranger", Role::TeamMember).await;
    let project_id = w.project_id.to_string();

    let team_uri = format!("/api/v1/projects/{}/team", w.project_id);
    let body = json!({ "action": "add_members", "members": [{ "user_id": uploader.id }] });
    let response = put_json_auth(app.clone(), &team_uri, &w.manager_token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let roster = body_json(response).await["data"].clone();
    let member_row = roster
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user_id"] == uploader.id)
        .unwrap()["id"]
        .clone();

    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/files",
        &token(&uploader),
        &[("project_id", &project_id)],
        Some(("draft.png", "image/png", vec![1u8; 256])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let file_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let file_uri = format!("/api/v1/files/{file_id}");

    let body = json!({ "action": "remove_member", "member_id": member_row });
    let response = put_json_auth(app.clone(), &team_uri, &w.manager_token, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app.clone(), &file_uri, &token(&stranger)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.delete_count(), 0);

    let response = delete_auth(app.clone(), &file_uri, &token(&uploader)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.delete_count(), 1);

    let response = delete_auth(app, &file_uri, &token(&uploader)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
