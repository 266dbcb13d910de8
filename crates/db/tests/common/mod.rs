//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use agency_core::roles::Role;
use agency_core::status::{Priority, ProjectStatus, TaskStatus};
use agency_core::types::DbId;
use agency_db::models::project::{CreateProject, Project};
use agency_db::models::task::{Task, TaskInput};
use agency_db::models::user::{NewUser, User};
use agency_db::repositories::{ProjectRepo, TaskRepo, UserRepo};
use chrono::{Duration, Utc};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, email: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &NewUser {
            name: Some(email.split('@').next().unwrap_or(email).to_string()),
            email: email.to_string(),
            role,
            is_active: true,
        },
    )
    .await
    .unwrap()
}

pub fn new_project(name: &str, client_id: DbId, manager_id: DbId) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: format!("{name} description"),
        client_id,
        manager_id,
        team_id: None,
        status: ProjectStatus::Pending,
        priority: Priority::Medium,
        budget: 1000.0,
        spent_amount: 0.0,
        currency: "USD".to_string(),
        start_date: None,
        due_date: Utc::now() + Duration::days(30),
        estimated_hours: None,
        actual_hours: 0.0,
        tags: None,
        notes: None,
    }
}

pub async fn project(pool: &PgPool, name: &str, client_id: DbId, manager_id: DbId) -> Project {
    ProjectRepo::create(pool, &new_project(name, client_id, manager_id))
        .await
        .unwrap()
}

pub fn new_task(project_id: DbId, title: &str, assignee_id: Option<DbId>) -> TaskInput {
    TaskInput {
        project_id,
        title: title.to_string(),
        description: None,
        status: TaskStatus::Pending,
        priority: Priority::Medium,
        deadline: None,
        estimated_hours: None,
        actual_hours: None,
        assignee_id,
    }
}

pub async fn task(pool: &PgPool, creator_id: DbId, input: TaskInput) -> Task {
    TaskRepo::create(pool, creator_id, &input).await.unwrap()
}

/// Four actors, one per role, plus a second client and manager.
pub struct Cast {
    pub admin: User,
    pub manager: User,
    pub other_manager: User,
    pub member: User,
    pub client: User,
    pub other_client: User,
}

pub async fn cast(pool: &PgPool) -> Cast {
    Cast {
        admin: user(pool, "admin@agency.test", Role::Admin).await,
        manager: user(pool, "pm@agency.test", Role::ProjectManager).await,
        other_manager: user(pool, "pm2@agency.test", Role::ProjectManager).await,
        member: user(pool, "dev@agency.test", Role::TeamMember).await,
        client: user(pool, "client@acme.test", Role::Client).await,
        other_client: user(pool, "client@globex.test", Role::Client).await,
    }
}
