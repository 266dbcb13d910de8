//! Row shapes read by the dashboard queries.

use agency_core::dashboard::{ActiveMembership, ManagedProject, ManagedTask};
use agency_core::roles::Role;
use agency_core::status::{ProjectStatus, TaskStatus};
use agency_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ManagedProjectRow {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub due_date: Option<Timestamp>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

impl From<ManagedProjectRow> for ManagedProject {
    fn from(row: ManagedProjectRow) -> Self {
        ManagedProject {
            id: row.id,
            name: row.name,
            status: row.status,
            due_date: row.due_date,
            total_tasks: row.total_tasks,
            completed_tasks: row.completed_tasks,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ManagedTaskRow {
    pub assignee_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
}

impl From<ManagedTaskRow> for ManagedTask {
    fn from(row: ManagedTaskRow) -> Self {
        ManagedTask {
            assignee_id: row.assignee_id,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub user_id: DbId,
    pub name: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

impl From<MembershipRow> for ActiveMembership {
    fn from(row: MembershipRow) -> Self {
        ActiveMembership {
            user_id: row.user_id,
            name: row.name,
            role: row.role,
        }
    }
}
