//! Task entity model and payload.

use agency_core::error::CoreError;
use agency_core::status::{Priority, TaskStatus};
use agency_core::types::{DbId, Timestamp};
use agency_core::validation::{
    non_blank, optional_non_negative, parse_optional_date, FieldErrors, NumericInput,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub assignee_id: Option<DbId>,
    pub creator_id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub deadline: Option<Timestamp>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A task with the names the task board displays.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub project_name: String,
    pub assignee_name: Option<String>,
    pub creator_name: Option<String>,
}

/// Task form as submitted. Used for both create and full update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TaskPayload {
    #[validate(length(min = 2, message = "Title is required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub estimated_hours: Option<NumericInput>,
    pub actual_hours: Option<NumericInput>,
    pub assignee_id: Option<DbId>,
    pub project_id: Option<DbId>,
}

/// Validated task fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub deadline: Option<Timestamp>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub assignee_id: Option<DbId>,
}

impl TaskPayload {
    pub fn into_input(self) -> Result<TaskInput, CoreError> {
        let mut errors = FieldErrors::from_validator(self.validate());
        let title = errors.require("title", non_blank(self.title), "Title is required");
        let project_id = errors.require("project_id", self.project_id, "Project is required");
        let status = match non_blank(self.status) {
            Some(s) => errors.check(TaskStatus::parse_field(&s)),
            None => Some(TaskStatus::default()),
        };
        let priority = match non_blank(self.priority) {
            Some(s) => errors.check(Priority::parse_field(&s)),
            None => Some(Priority::default()),
        };
        let deadline = errors
            .check(parse_optional_date("deadline", self.deadline.as_deref()))
            .flatten();
        let estimated_hours = errors
            .check(optional_non_negative("estimated_hours", self.estimated_hours.as_ref()))
            .flatten();
        let actual_hours = errors
            .check(optional_non_negative("actual_hours", self.actual_hours.as_ref()))
            .flatten();
        errors.into_result()?;

        match (title, project_id, status, priority) {
            (Some(title), Some(project_id), Some(status), Some(priority)) => Ok(TaskInput {
                project_id,
                title,
                description: non_blank(self.description),
                status,
                priority,
                deadline,
                estimated_hours,
                actual_hours,
                assignee_id: self.assignee_id,
            }),
            _ => Err(CoreError::Internal("task payload accepted with missing fields".into())),
        }
    }
}
