//! Project entity model, list/detail views, and payloads.

use agency_core::access::{can_see_budget, resolve_manager};
use agency_core::error::CoreError;
use agency_core::progress::{budget_health, budget_usage, progress, BudgetHealth};
use agency_core::roles::{Actor, Role};
use agency_core::search::like_pattern;
use agency_core::status::{Priority, ProjectStatus};
use agency_core::types::{DbId, Timestamp};
use agency_core::validation::{
    non_blank, optional_non_negative, parse_date, parse_optional_date, required_non_negative,
    FieldError, FieldErrors, NumericInput,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::file::FileRecord;
use crate::models::invoice::InvoiceListItem;
use crate::models::milestone::Milestone;
use crate::models::task::TaskListItem;
use crate::models::team::{TeamMemberWithUser, TeamOption};
use crate::models::timeline_event::TimelineEvent;
use crate::models::user::UserSummary;

pub const DEFAULT_CURRENCY: &str = "USD";

/// A row from the `projects` table.
///
/// `budget` and `spent_amount` are always present in storage; they are
/// optional here so the row can be redacted for viewers without access.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub client_id: DbId,
    pub manager_id: DbId,
    pub team_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub budget: Option<f64>,
    pub spent_amount: Option<f64>,
    pub currency: String,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Drop financial fields for viewers who may not see them.
    pub fn redact_budget(&mut self) {
        self.budget = None;
        self.spent_amount = None;
    }

    fn financials(&self) -> Financials {
        match (self.spent_amount, self.budget) {
            (Some(spent), Some(budget)) => Financials {
                usage: Some(budget_usage(spent, budget)),
                health: Some(budget_health(spent, budget)),
                remaining: Some(budget - spent),
            },
            _ => Financials::default(),
        }
    }
}

#[derive(Debug, Default)]
struct Financials {
    usage: Option<i64>,
    health: Option<BudgetHealth>,
    remaining: Option<f64>,
}

// ---------------------------------------------------------------------------
// List and detail views
// ---------------------------------------------------------------------------

/// A project joined with names and child counts, as listed.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectSummaryRow {
    #[sqlx(flatten)]
    pub project: Project,
    pub client_name: Option<String>,
    pub manager_name: Option<String>,
    pub team_name: Option<String>,
    pub task_count: i64,
    pub completed_task_count: i64,
    pub file_count: i64,
    pub invoice_count: i64,
}

/// Listing entry with derived progress and budget figures.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub client_name: Option<String>,
    pub manager_name: Option<String>,
    pub team_name: Option<String>,
    pub task_count: i64,
    pub completed_task_count: i64,
    pub file_count: i64,
    pub invoice_count: i64,
    pub progress: i64,
    pub budget_usage: Option<i64>,
    pub budget_health: Option<BudgetHealth>,
    pub budget_remaining: Option<f64>,
}

impl ProjectSummary {
    /// Derive read-path figures, redacting financials for `viewer` if needed.
    pub fn for_viewer(row: ProjectSummaryRow, viewer: Role) -> Self {
        let mut project = row.project;
        if !can_see_budget(viewer) {
            project.redact_budget();
        }
        let financials = project.financials();
        Self {
            progress: progress(row.completed_task_count, row.task_count),
            budget_usage: financials.usage,
            budget_health: financials.health,
            budget_remaining: financials.remaining,
            project,
            client_name: row.client_name,
            manager_name: row.manager_name,
            team_name: row.team_name,
            task_count: row.task_count,
            completed_task_count: row.completed_task_count,
            file_count: row.file_count,
            invoice_count: row.invoice_count,
        }
    }
}

/// Everything the project page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub summary: ProjectSummary,
    pub message_count: i64,
    pub tasks: Vec<TaskListItem>,
    pub files: Vec<FileRecord>,
    pub invoices: Vec<InvoiceListItem>,
    pub milestones: Vec<Milestone>,
    pub timeline_events: Vec<TimelineEvent>,
    pub team_members: Vec<TeamMemberWithUser>,
}

/// Choices offered by the project form.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectFormOptions {
    pub clients: Vec<UserSummary>,
    pub managers: Vec<UserSummary>,
    pub teams: Vec<TeamOption>,
}

// ---------------------------------------------------------------------------
// Listing and search filters
// ---------------------------------------------------------------------------

/// Query-string filters for `GET /projects`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub include_archived: bool,
    /// Free-text match over name, description and tags.
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub client_id: Option<DbId>,
    pub manager_id: Option<DbId>,
}

/// Validated listing filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilters {
    pub include_archived: bool,
    /// Escaped `ILIKE` pattern for the free-text match.
    pub text_pattern: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub client_id: Option<DbId>,
    pub manager_id: Option<DbId>,
}

impl ProjectFilters {
    /// Any text or structured filter switches listing into search mode.
    pub fn is_search(&self) -> bool {
        self.text_pattern.is_some()
            || self.status.is_some()
            || self.priority.is_some()
            || self.client_id.is_some()
            || self.manager_id.is_some()
    }
}

impl ProjectQuery {
    pub fn into_filters(self) -> Result<ProjectFilters, CoreError> {
        let mut errors = FieldErrors::new();
        let status = non_blank(self.status).and_then(|s| errors.check(ProjectStatus::parse_field(&s)));
        let priority = non_blank(self.priority).and_then(|s| errors.check(Priority::parse_field(&s)));
        errors.into_result()?;
        Ok(ProjectFilters {
            include_archived: self.include_archived,
            text_pattern: self.q.as_deref().and_then(like_pattern),
            status,
            priority,
            client_id: self.client_id,
            manager_id: self.manager_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Create / update payload
// ---------------------------------------------------------------------------

/// Project form as submitted. Numeric fields accept numbers or strings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectPayload {
    #[validate(length(min = 2, message = "Project name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 5, message = "Description is required"))]
    pub description: Option<String>,
    pub client_id: Option<DbId>,
    pub manager_id: Option<DbId>,
    pub team_id: Option<DbId>,
    pub budget: Option<NumericInput>,
    pub spent_amount: Option<NumericInput>,
    pub currency: Option<String>,
    pub due_date: Option<String>,
    pub start_date: Option<String>,
    pub estimated_hours: Option<NumericInput>,
    pub actual_hours: Option<NumericInput>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

/// Validated insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub client_id: DbId,
    pub manager_id: DbId,
    pub team_id: Option<DbId>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub budget: f64,
    pub spent_amount: f64,
    pub currency: String,
    pub start_date: Option<Timestamp>,
    pub due_date: Timestamp,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

/// Validated patch. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<DbId>,
    pub manager_id: Option<DbId>,
    pub team_id: Option<DbId>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub budget: Option<f64>,
    pub spent_amount: Option<f64>,
    pub currency: Option<String>,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

impl ProjectPayload {
    /// Validate a creation request from `actor`.
    ///
    /// A project manager always becomes the manager of the new project.
    pub fn into_create(self, actor: &Actor) -> Result<CreateProject, CoreError> {
        actor.ensure_can_manage()?;
        let mut errors = FieldErrors::from_validator(self.validate());

        let name = errors.require("name", non_blank(self.name), "Project name is required");
        let description =
            errors.require("description", non_blank(self.description), "Description is required");
        let client_id = errors.require("client_id", self.client_id, "Client is required");
        let manager_id = match resolve_manager(actor, self.manager_id) {
            Ok(id) => Some(id),
            Err(CoreError::Validation(fields)) => {
                fields.into_iter().for_each(|f| errors.push(f));
                None
            }
            Err(other) => return Err(other),
        };
        let budget = errors.check(required_non_negative("budget", self.budget.as_ref()));
        let spent_amount = errors
            .check(optional_non_negative("spent_amount", self.spent_amount.as_ref()))
            .map(|v| v.unwrap_or(0.0));
        let actual_hours = errors
            .check(optional_non_negative("actual_hours", self.actual_hours.as_ref()))
            .map(|v| v.unwrap_or(0.0));
        let estimated_hours = errors
            .check(optional_non_negative("estimated_hours", self.estimated_hours.as_ref()))
            .flatten();
        let due_date = match non_blank(self.due_date) {
            Some(raw) => errors.check(parse_date("due_date", &raw)),
            None => {
                errors.push(FieldError::new("due_date", "Due date is required"));
                None
            }
        };
        let start_date = errors
            .check(parse_optional_date("start_date", self.start_date.as_deref()))
            .flatten();
        let status = match non_blank(self.status) {
            Some(s) => errors.check(ProjectStatus::parse_field(&s)),
            None => Some(ProjectStatus::default()),
        };
        let priority = match non_blank(self.priority) {
            Some(s) => errors.check(Priority::parse_field(&s)),
            None => Some(Priority::default()),
        };

        errors.into_result()?;

        match (
            name, description, client_id, manager_id, budget, spent_amount, actual_hours, due_date,
            status, priority,
        ) {
            (
                Some(name),
                Some(description),
                Some(client_id),
                Some(manager_id),
                Some(budget),
                Some(spent_amount),
                Some(actual_hours),
                Some(due_date),
                Some(status),
                Some(priority),
            ) => Ok(CreateProject {
                name,
                description,
                client_id,
                manager_id,
                team_id: self.team_id,
                status,
                priority,
                budget,
                spent_amount,
                currency: non_blank(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                start_date,
                due_date,
                estimated_hours,
                actual_hours,
                tags: non_blank(self.tags),
                notes: non_blank(self.notes),
            }),
            _ => Err(CoreError::Internal(
                "project payload accepted with missing required fields".into(),
            )),
        }
    }

    /// Validate a partial update from `actor`.
    ///
    /// A project manager's edit always (re)assigns the project to them.
    pub fn into_update(self, actor: &Actor) -> Result<UpdateProject, CoreError> {
        actor.ensure_can_manage()?;
        let mut errors = FieldErrors::from_validator(self.validate());

        let budget = errors.check(optional_non_negative("budget", self.budget.as_ref())).flatten();
        let spent_amount = errors
            .check(optional_non_negative("spent_amount", self.spent_amount.as_ref()))
            .flatten();
        let actual_hours = errors
            .check(optional_non_negative("actual_hours", self.actual_hours.as_ref()))
            .flatten();
        let estimated_hours = errors
            .check(optional_non_negative("estimated_hours", self.estimated_hours.as_ref()))
            .flatten();
        let due_date = errors
            .check(parse_optional_date("due_date", self.due_date.as_deref()))
            .flatten();
        let start_date = errors
            .check(parse_optional_date("start_date", self.start_date.as_deref()))
            .flatten();
        let status = non_blank(self.status).and_then(|s| errors.check(ProjectStatus::parse_field(&s)));
        let priority = non_blank(self.priority).and_then(|s| errors.check(Priority::parse_field(&s)));

        errors.into_result()?;

        let manager_id = match actor.role {
            Role::ProjectManager => Some(actor.id),
            _ => self.manager_id,
        };

        Ok(UpdateProject {
            name: non_blank(self.name),
            description: non_blank(self.description),
            client_id: self.client_id,
            manager_id,
            team_id: self.team_id,
            status,
            priority,
            budget,
            spent_amount,
            currency: non_blank(self.currency),
            start_date,
            due_date,
            estimated_hours,
            actual_hours,
            tags: non_blank(self.tags),
            notes: non_blank(self.notes),
        })
    }
}

// ---------------------------------------------------------------------------
// Focused updates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// A requested status change. Notes are stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: ProjectStatus,
    pub notes: Option<String>,
}

impl StatusPayload {
    pub fn into_change(self) -> Result<StatusChange, CoreError> {
        let raw = self
            .status
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::invalid_field("status", "Status is required"))?;
        let status = ProjectStatus::parse_field(raw.trim()).map_err(|e| CoreError::Validation(vec![e]))?;
        Ok(StatusChange {
            status,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetPayload {
    pub budget: Option<NumericInput>,
    pub spent_amount: Option<NumericInput>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUpdate {
    pub budget: f64,
    pub spent_amount: f64,
    pub currency: String,
}

impl BudgetPayload {
    pub fn into_update(self) -> Result<BudgetUpdate, CoreError> {
        let mut errors = FieldErrors::new();
        let budget = errors.check(required_non_negative("budget", self.budget.as_ref()));
        let spent_amount = errors.check(required_non_negative("spent_amount", self.spent_amount.as_ref()));
        errors.into_result()?;
        match (budget, spent_amount) {
            (Some(budget), Some(spent_amount)) => Ok(BudgetUpdate {
                budget,
                spent_amount,
                currency: non_blank(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            }),
            _ => Err(CoreError::Internal("budget payload accepted with missing fields".into())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimelinePayload {
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub estimated_hours: Option<NumericInput>,
}

/// Replaces the whole timeline; absent optional fields are cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineUpdate {
    pub start_date: Option<Timestamp>,
    pub due_date: Timestamp,
    pub estimated_hours: Option<f64>,
}

impl TimelinePayload {
    pub fn into_update(self) -> Result<TimelineUpdate, CoreError> {
        let mut errors = FieldErrors::new();
        let due_date = match non_blank(self.due_date) {
            Some(raw) => errors.check(parse_date("due_date", &raw)),
            None => {
                errors.push(FieldError::new("due_date", "Due date is required"));
                None
            }
        };
        let start_date = errors
            .check(parse_optional_date("start_date", self.start_date.as_deref()))
            .flatten();
        let estimated_hours = errors
            .check(optional_non_negative("estimated_hours", self.estimated_hours.as_ref()))
            .flatten();
        errors.into_result()?;
        due_date
            .map(|due_date| TimelineUpdate {
                start_date,
                due_date,
                estimated_hours,
            })
            .ok_or_else(|| CoreError::Internal("timeline payload accepted without due date".into()))
    }
}
