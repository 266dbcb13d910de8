//! Project timeline event model and payload.

use agency_core::error::CoreError;
use agency_core::types::{DbId, Timestamp};
use agency_core::validation::{non_blank, parse_date, FieldError, FieldErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timeline_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEvent {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Free-form label such as `meeting` or `delivery`.
    pub event_type: String,
    pub event_date: Timestamp,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimelineEventPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub event_type: Option<String>,
    pub event_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEventInput {
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub event_date: Timestamp,
}

impl TimelineEventPayload {
    pub fn into_input(self) -> Result<TimelineEventInput, CoreError> {
        let mut errors = FieldErrors::new();
        let title = errors.require("title", non_blank(self.title), "Title is required");
        let event_type = errors.require("event_type", non_blank(self.event_type), "Event type is required");
        let event_date = match non_blank(self.event_date) {
            Some(raw) => errors.check(parse_date("event_date", &raw)),
            None => {
                errors.push(FieldError::new("event_date", "Event date is required"));
                None
            }
        };
        errors.into_result()?;
        match (title, event_type, event_date) {
            (Some(title), Some(event_type), Some(event_date)) => Ok(TimelineEventInput {
                title,
                description: non_blank(self.description),
                event_type,
                event_date,
            }),
            _ => Err(CoreError::Internal("timeline event payload accepted with missing fields".into())),
        }
    }
}
