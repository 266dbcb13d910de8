//! Project milestone model and payload.

use agency_core::error::CoreError;
use agency_core::status::MilestoneStatus;
use agency_core::types::{DbId, Timestamp};
use agency_core::validation::{non_blank, parse_date, FieldError, FieldErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `milestones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Timestamp,
    #[sqlx(try_from = "String")]
    pub status: MilestoneStatus,
    pub sort_order: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MilestonePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub sort_order: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Timestamp,
    pub sort_order: i32,
    pub status: MilestoneStatus,
}

impl MilestonePayload {
    pub fn into_input(self) -> Result<MilestoneInput, CoreError> {
        let mut errors = FieldErrors::new();
        let title = errors.require("title", non_blank(self.title), "Title is required");
        let due_date = match non_blank(self.due_date) {
            Some(raw) => errors.check(parse_date("due_date", &raw)),
            None => {
                errors.push(FieldError::new("due_date", "Due date is required"));
                None
            }
        };
        let status = match non_blank(self.status) {
            Some(s) => errors.check(MilestoneStatus::parse_field(&s)),
            None => Some(MilestoneStatus::default()),
        };
        if matches!(self.sort_order, Some(n) if n < 0) {
            errors.push(FieldError::new("sort_order", "must be a non-negative number"));
        }
        errors.into_result()?;
        match (title, due_date, status) {
            (Some(title), Some(due_date), Some(status)) => Ok(MilestoneInput {
                title,
                description: non_blank(self.description),
                due_date,
                sort_order: self.sort_order.unwrap_or(0),
                status,
            }),
            _ => Err(CoreError::Internal("milestone payload accepted with missing fields".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_order_and_status() {
        let input = MilestonePayload {
            title: Some("Wireframes".into()),
            due_date: Some("2026-08-01".into()),
            ..Default::default()
        }
        .into_input()
        .unwrap();
        assert_eq!(input.sort_order, 0);
        assert_eq!(input.status, MilestoneStatus::Pending);
    }

    #[test]
    fn negative_order_is_rejected() {
        let result = MilestonePayload {
            title: Some("Wireframes".into()),
            due_date: Some("2026-08-01".into()),
            sort_order: Some(-1),
            ..Default::default()
        }
        .into_input();
        assert!(result.is_err());
    }
}
