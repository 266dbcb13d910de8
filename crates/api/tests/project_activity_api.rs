//! HTTP-level tests for project milestones, timeline events, budget and
//! schedule updates, and the pickers used by project forms.

mod common;

use agency_core::roles::Role;
use agency_db::models::user::{NewUser, User};
use agency_db::repositories::UserRepo;
use axum::http::StatusCode;
use axum::Router;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth, seed_user, token};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_project(app: Router, manager: &User, client: &User) -> i64 {
    let body = json!({
        "name": "Acme Website",
        "description": "Marketing site rebuild",
        "client_id": client.id,
        "budget": 2000,
        "due_date": "2030-06-01",
    });
    let response = post_json_auth(app, "/api/v1/projects", &token(manager), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn field_names(json: &Value) -> Vec<String> {
    json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str().map(str::to_string))
        .collect()
}

fn names(json: &Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["name"].as_str().map(str::to_string))
        .collect()
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn milestone_lifecycle(pool: PgPool) {
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let client = seed_user(&pool, "client", Role::Client).await;
    let stranger = seed_user(&pool, "stranger", Role::Client).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(app.clone(), &manager, &client).await;
    let list_uri = format!("/api/v1/projects/{project_id}/milestones");

    let body = json!({ "title": "Wireframes", "due_date": "2030-03-01", "sort_order": 1 });
    let response = post_json_auth(app.clone(), &list_uri, &token(&client), body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.clone(), &list_uri, &token(&manager), body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let milestone = body_json(response).await["data"].clone();
    assert_eq!(milestone["title"], "Wireframes");
    assert_eq!(milestone["status"], "PENDING");
    assert_eq!(milestone["project_id"], project_id);
    assert!(milestone["completed_at"].is_null());
    let milestone_uri = format!("/api/v1/milestones/{}", milestone["id"]);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/projects/999999/milestones",
        &token(&manager),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response =
        post_json_auth(app.clone(), &list_uri, &token(&manager), json!({ "sort_order": 2 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let fields = field_names(&body_json(response).await);
    assert!(fields.contains(&"title".to_string()));
    assert!(fields.contains(&"due_date".to_string()));

    // Listing follows project read access.
    let response = get_auth(app.clone(), &list_uri, &token(&client)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
    let response = get_auth(app.clone(), &list_uri, &token(&stranger)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let update = json!({ "title": "Wireframes v2", "due_date": "2030-03-15", "status": "COMPLETED" });
    let response = put_json_auth(app.clone(), &milestone_uri, &token(&manager), update.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["title"], "Wireframes v2");
    assert_eq!(updated["status"], "COMPLETED");
    assert!(updated["completed_at"].is_string());
    assert!(updated["due_date"].as_str().unwrap().starts_with("2030-03-15"));

    let response =
        put_json_auth(app.clone(), "/api/v1/milestones/999999", &token(&manager), update).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let detail_uri = format!("/api/v1/projects/{project_id}");
    let response = get_auth(app.clone(), &detail_uri, &token(&client)).await;
    assert_eq!(body_json(response).await["data"]["milestones"][0]["title"], "Wireframes v2");

    let response = delete_auth(app.clone(), &milestone_uri, &token(&client)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = delete_auth(app.clone(), &milestone_uri, &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete_auth(app.clone(), &milestone_uri, &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &list_uri, &token(&client)).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Timeline events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn timeline_event_lifecycle(pool: PgPool) {
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let client = seed_user(&pool, "client", Role::Client).await;
    let stranger = seed_user(&pool, "stranger", Role::TeamMember).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(app.clone(), &manager, &client).await;
    let list_uri = format!("/api/v1/projects/{project_id}/timeline-events");

    let body = json!({
        "title": "Design review",
        "type": "meeting",
        "event_date": "2030-02-10T15:00:00Z",
    });
    let response = post_json_auth(app.clone(), &list_uri, &token(&manager), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = body_json(response).await["data"].clone();
    assert_eq!(event["event_type"], "meeting");
    assert_eq!(event["created_by"], manager.id);
    let event_uri = format!("/api/v1/timeline-events/{}", event["id"]);

    let early = json!({ "title": "Kickoff", "event_type": "meeting", "event_date": "2030-01-05" });
    let response = post_json_auth(app.clone(), &list_uri, &token(&manager), early).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app.clone(), &list_uri, &token(&client)).await;
    let events = body_json(response).await["data"].clone();
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Kickoff", "Design review"]);

    let response = get_auth(app.clone(), &list_uri, &token(&stranger)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let update = json!({
        "title": "Design review (moved)",
        "event_type": "meeting",
        "event_date": "2030-02-12T15:00:00Z",
    });
    let response = put_json_auth(app.clone(), &event_uri, &token(&stranger), update.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = put_json_auth(app.clone(), &event_uri, &token(&manager), update).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "Design review (moved)");

    let response = put_json_auth(app.clone(), &event_uri, &token(&manager), json!({ "title": "x" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(app.clone(), &event_uri, &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete_auth(app, &event_uri, &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Budget and schedule
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn budget_update_drives_usage_and_health(pool: PgPool) {
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let client = seed_user(&pool, "client", Role::Client).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(app.clone(), &manager, &client).await;
    let uri = format!("/api/v1/projects/{project_id}/budget");

    let body = json!({ "budget": 2000, "spent_amount": "1500" });
    let response = put_json_auth(app.clone(), &uri, &token(&client), body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(app.clone(), &uri, &token(&manager), body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let project = body_json(response).await["data"].clone();
    assert_eq!(project["budget"], 2000.0);
    assert_eq!(project["spent_amount"], 1500.0);
    assert_eq!(project["currency"], "USD");

    let detail_uri = format!("/api/v1/projects/{project_id}");
    let response = get_auth(app.clone(), &detail_uri, &token(&manager)).await;
    let detail = body_json(response).await["data"].clone();
    assert_eq!(detail["budget_usage"], 75);
    assert_eq!(detail["budget_health"], "WARNING");
    assert_eq!(detail["budget_remaining"], 500.0);

    let response = put_json_auth(app.clone(), &uri, &token(&manager), json!({ "budget": 10 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body_json(response).await), vec!["spent_amount"]);

    let response = put_json_auth(
        app,
        "/api/v1/projects/999999/budget",
        &token(&manager),
        json!({ "budget": 1, "spent_amount": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn timeline_update_replaces_schedule(pool: PgPool) {
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let client = seed_user(&pool, "client", Role::Client).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(app.clone(), &manager, &client).await;
    let uri = format!("/api/v1/projects/{project_id}/timeline");

    let body = json!({ "start_date": "2030-01-10", "due_date": "2030-09-01", "estimated_hours": 120 });
    let response = put_json_auth(app.clone(), &uri, &token(&manager), body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let project = body_json(response).await["data"].clone();
    assert!(project["start_date"].as_str().unwrap().starts_with("2030-01-10"));
    assert!(project["due_date"].as_str().unwrap().starts_with("2030-09-01"));
    assert_eq!(project["estimated_hours"], 120.0);

    let response = put_json_auth(app.clone(), &uri, &token(&manager), json!({ "due_date": "2030-10-01" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let project = body_json(response).await["data"].clone();
    assert!(project["start_date"].is_null());
    assert!(project["estimated_hours"].is_null());
    assert!(project["due_date"].as_str().unwrap().starts_with("2030-10-01"));

    let response = put_json_auth(app, &uri, &token(&manager), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body_json(response).await), vec!["due_date"]);
}

// ---------------------------------------------------------------------------
// Pickers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn form_options_list_active_people_and_teams(pool: PgPool) {
    let admin = seed_user(&pool, "admin", Role::Admin).await;
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let client = seed_user(&pool, "client", Role::Client).await;
    let member = seed_user(&pool, "member", Role::TeamMember).await;
    UserRepo::create(
        &pool,
        &NewUser {
            name: Some("gone".to_string()),
            email: "gone@agency.test".to_string(),
            role: Role::Client,
            is_active: false,
        },
    )
    .await
    .unwrap();
    let app = common::build_test_app(pool);

    let body = json!({ "name": "Design", "member_ids": [member.id] });
    let response = post_json_auth(app.clone(), "/api/v1/teams", &token(&admin), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json!({ "name": "Dormant", "is_active": false });
    let response = post_json_auth(app.clone(), "/api/v1/teams", &token(&admin), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app.clone(), "/api/v1/projects/form-options", &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let options = body_json(response).await["data"].clone();
    assert_eq!(names(&options["clients"]), vec!["client"]);
    assert_eq!(names(&options["managers"]), vec!["manager"]);
    assert_eq!(names(&options["teams"]), vec!["Design"]);

    let response = get_auth(app.clone(), "/api/v1/projects/form-options", &token(&client)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), "/api/v1/users/assignable", &token(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(names(&body_json(response).await["data"]), vec!["manager", "member"]);

    let response = get_auth(app, "/api/v1/users/assignable", &token(&member)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
