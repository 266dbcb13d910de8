//! Invoice entity model and payload.

use agency_core::error::CoreError;
use agency_core::status::InvoiceStatus;
use agency_core::types::{DbId, Timestamp};
use agency_core::validation::{
    non_blank, parse_date, parse_optional_date, required_non_negative, FieldError, FieldErrors,
    NumericInput,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::project::DEFAULT_CURRENCY;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub project_id: DbId,
    pub client_id: DbId,
    pub amount: f64,
    pub currency: String,
    pub due_date: Timestamp,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub payment_link: Option<String>,
    pub receipt_url: Option<String>,
    #[serde(skip_serializing)]
    pub receipt_public_id: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An invoice with its project and client names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub project_name: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
}

/// Query-string for `GET /invoices`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceQuery {
    /// View the list as this role. Defaults to the caller's own role.
    pub role: Option<String>,
}

/// Invoice form as submitted. Used for both create and full update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoicePayload {
    pub project_id: Option<DbId>,
    pub client_id: Option<DbId>,
    pub amount: Option<NumericInput>,
    pub currency: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub payment_link: Option<String>,
    pub receipt_url: Option<String>,
    pub paid_at: Option<String>,
}

/// Validated invoice fields.
///
/// `paid_at` is filled with the current time by the repository when the
/// status is `PAID` and no payment time was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInput {
    pub project_id: DbId,
    pub client_id: DbId,
    pub amount: f64,
    pub currency: String,
    pub due_date: Timestamp,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub payment_link: Option<String>,
    pub receipt_url: Option<String>,
    pub paid_at: Option<Timestamp>,
}

impl InvoicePayload {
    pub fn into_input(self) -> Result<InvoiceInput, CoreError> {
        let mut errors = FieldErrors::new();
        let project_id = errors.require("project_id", self.project_id, "Project is required");
        let client_id = errors.require("client_id", self.client_id, "Client is required");
        let amount = errors.check(required_non_negative("amount", self.amount.as_ref()));
        let due_date = match non_blank(self.due_date) {
            Some(raw) => errors.check(parse_date("due_date", &raw)),
            None => {
                errors.push(FieldError::new("due_date", "Due date is required"));
                None
            }
        };
        let status = match non_blank(self.status) {
            Some(s) => errors.check(InvoiceStatus::parse_field(&s)),
            None => Some(InvoiceStatus::default()),
        };
        let paid_at = errors
            .check(parse_optional_date("paid_at", self.paid_at.as_deref()))
            .flatten();
        errors.into_result()?;

        match (project_id, client_id, amount, due_date, status) {
            (Some(project_id), Some(client_id), Some(amount), Some(due_date), Some(status)) => {
                Ok(InvoiceInput {
                    project_id,
                    client_id,
                    amount,
                    currency: non_blank(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                    due_date,
                    status,
                    notes: non_blank(self.notes),
                    payment_link: non_blank(self.payment_link),
                    receipt_url: non_blank(self.receipt_url),
                    // Payment time only means something on a paid invoice.
                    paid_at: if status == InvoiceStatus::Paid { paid_at } else { None },
                })
            }
            _ => Err(CoreError::Internal("invoice payload accepted with missing fields".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn payload() -> InvoicePayload {
        InvoicePayload {
            project_id: Some(1),
            client_id: Some(2),
            amount: Some(NumericInput::Text("250.00".into())),
            due_date: Some("2026-07-01".into()),
            ..Default::default()
        }
    }

    #[test]
    fn amount_strings_are_coerced() {
        let input = payload().into_input().unwrap();
        assert_eq!(input.amount, 250.0);
        assert_eq!(input.status, InvoiceStatus::Pending);
        assert_eq!(input.currency, "USD");
    }

    #[test]
    fn paid_at_is_dropped_unless_paid() {
        let mut unpaid = payload();
        unpaid.paid_at = Some("2026-06-01".into());
        assert_eq!(unpaid.into_input().unwrap().paid_at, None);

        let mut paid = payload();
        paid.status = Some("PAID".into());
        paid.paid_at = Some("2026-06-01".into());
        assert!(paid.into_input().unwrap().paid_at.is_some());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut bad = payload();
        bad.amount = Some(NumericInput::Number(-1.0));
        assert_matches!(bad.into_input(), Err(CoreError::Validation(ref f)) if f[0].field == "amount");
    }
}
