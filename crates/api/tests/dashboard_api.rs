//! The project-manager dashboard end to end.

mod common;

use agency_core::progress::month_window;
use agency_core::roles::Role;
use agency_core::status::{InvoiceStatus, Priority, TaskStatus};
use agency_core::types::DbId;
use agency_db::models::invoice::InvoiceInput;
use agency_db::models::project::{CreateProject, UpdateProject};
use agency_db::models::task::TaskInput;
use agency_db::models::team::TeamInput;
use agency_db::repositories::{InvoiceRepo, ProjectRepo, TaskRepo, TeamRepo};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get_auth, seed_user, token};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn project(pool: &PgPool, name: &str, client_id: DbId, manager_id: DbId) -> DbId {
    let input = CreateProject {
        name: name.to_string(),
        description: format!("{name} description"),
        client_id,
        manager_id,
        team_id: None,
        status: Default::default(),
        priority: Priority::Medium,
        budget: 1000.0,
        spent_amount: 0.0,
        currency: "USD".to_string(),
        start_date: None,
        due_date: Utc::now() + Duration::days(10),
        estimated_hours: None,
        actual_hours: 0.0,
        tags: None,
        notes: None,
    };
    ProjectRepo::create(pool, &input).await.unwrap().id
}

async fn attach_team(pool: &PgPool, project_id: DbId, name: &str, member_ids: Vec<DbId>) {
    let team = TeamRepo::create(
        pool,
        &TeamInput {
            name: name.to_string(),
            description: None,
            is_active: true,
            lead_id: None,
            member_ids,
        },
    )
    .await
    .unwrap();
    let update = UpdateProject {
        team_id: Some(team.id),
        ..Default::default()
    };
    ProjectRepo::update(pool, project_id, &update, None).await.unwrap();
}

async fn task(pool: &PgPool, project_id: DbId, creator: DbId, assignee: Option<DbId>, status: TaskStatus) {
    let input = TaskInput {
        project_id,
        title: "Build".to_string(),
        description: None,
        status,
        priority: Priority::Medium,
        deadline: None,
        estimated_hours: None,
        actual_hours: None,
        assignee_id: assignee,
    };
    TaskRepo::create(pool, creator, &input).await.unwrap();
}

async fn paid_invoice(pool: &PgPool, project_id: DbId, client_id: DbId, amount: f64, paid_at: chrono::DateTime<Utc>) {
    let input = InvoiceInput {
        project_id,
        client_id,
        amount,
        currency: "USD".to_string(),
        due_date: paid_at,
        status: InvoiceStatus::Paid,
        notes: None,
        payment_link: None,
        receipt_url: None,
        paid_at: Some(paid_at),
    };
    InvoiceRepo::create(pool, &input).await.unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_folds_managed_work(pool: PgPool) {
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let other_manager = seed_user(&pool, "other", Role::ProjectManager).await;
    let client = seed_user(&pool, "client", Role::Client).await;
    let member = seed_user(&pool, "member", Role::TeamMember).await;

    let site = project(&pool, "Acme Website", client.id, manager.id).await;
    let app_project = project(&pool, "Acme App", client.id, manager.id).await;
    let foreign = project(&pool, "Globex", client.id, other_manager.id).await;

    // The same person on two teams under one manager counts once.
    attach_team(&pool, site, "Web", vec![member.id]).await;
    attach_team(&pool, app_project, "Mobile", vec![member.id]).await;

    task(&pool, site, manager.id, Some(member.id), TaskStatus::Completed).await;
    task(&pool, site, manager.id, Some(member.id), TaskStatus::Pending).await;
    task(&pool, app_project, manager.id, None, TaskStatus::Pending).await;
    task(&pool, foreign, other_manager.id, Some(member.id), TaskStatus::Pending).await;

    let now = Utc::now();
    let (previous_month, _) = month_window(now, 1);
    paid_invoice(&pool, site, client.id, 500.0, now).await;
    paid_invoice(&pool, app_project, client.id, 300.0, previous_month + Duration::days(1)).await;
    paid_invoice(&pool, foreign, client.id, 9000.0, now).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/dashboard/project-manager", &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let dash = body_json(response).await["data"].clone();

    let stats = &dash["stats"];
    assert_eq!(stats["active_projects"], 2);
    assert_eq!(stats["team_members"], 1);
    assert_eq!(stats["pending_tasks"], 2);
    assert_eq!(stats["revenue"], 500.0);
    assert_eq!(stats["revenue_growth"], 67);
    // No managed project was created last month.
    assert_eq!(stats["project_growth"], 100);

    let projects = dash["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    let site_entry = projects.iter().find(|p| p["id"] == site).unwrap();
    assert_eq!(site_entry["progress"], 50);

    let performance = dash["team_performance"].as_array().unwrap();
    assert_eq!(performance.len(), 1);
    assert_eq!(performance[0]["user_id"], member.id);
    assert_eq!(performance[0]["total_tasks"], 2);
    assert_eq!(performance[0]["completion_rate"], 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_dashboard_is_all_zeroes(pool: PgPool) {
    let manager = seed_user(&pool, "manager", Role::ProjectManager).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/dashboard/project-manager", &token(&manager)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let dash = body_json(response).await["data"].clone();
    assert_eq!(dash["stats"]["active_projects"], 0);
    assert_eq!(dash["stats"]["project_growth"], 0);
    assert_eq!(dash["stats"]["revenue_growth"], 0);
    assert!(dash["projects"].as_array().unwrap().is_empty());
}
