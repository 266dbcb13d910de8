//! Repository for the `invoices` table.

use agency_core::access::ScopeFilter;
use agency_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::filter::{bind_values, WhereBuilder};
use crate::models::invoice::{Invoice, InvoiceInput, InvoiceListItem};

/// Column list for `invoices` queries.
const COLUMNS: &str = "id, project_id, client_id, amount, currency, due_date, status, notes, \
    payment_link, receipt_url, receipt_public_id, paid_at, created_at, updated_at";

/// Listing projection with project and client details.
const LIST_SELECT: &str = "SELECT i.id, i.project_id, i.client_id, i.amount, i.currency, \
    i.due_date, i.status, i.notes, i.payment_link, i.receipt_url, i.receipt_public_id, \
    i.paid_at, i.created_at, i.updated_at, \
    p.name AS project_name, c.name AS client_name, c.email AS client_email \
    FROM invoices i \
    JOIN projects p ON p.id = i.project_id \
    LEFT JOIN users c ON c.id = i.client_id";

/// Provides CRUD and revenue queries for invoices.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Invoices visible under `scope`, newest first.
    pub async fn list(
        pool: &PgPool,
        scope: &ScopeFilter,
    ) -> Result<Vec<InvoiceListItem>, sqlx::Error> {
        let mut w = WhereBuilder::new();
        w.push_scope(scope, "p", Some("i.client_id"));
        let query = format!("{LIST_SELECT} {} ORDER BY i.created_at DESC", w.where_clause());
        let q = sqlx::query_as::<_, InvoiceListItem>(&query);
        bind_values(q, w.binds()).fetch_all(pool).await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<InvoiceListItem>, sqlx::Error> {
        let query = format!("{LIST_SELECT} WHERE i.project_id = $1 ORDER BY i.created_at DESC");
        sqlx::query_as::<_, InvoiceListItem>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an invoice. A PAID invoice without `paid_at` is stamped now.
    pub async fn create(pool: &PgPool, input: &InvoiceInput) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices (project_id, client_id, amount, currency, due_date, status, \
                notes, payment_link, receipt_url, paid_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                CASE WHEN $6 = 'PAID' THEN COALESCE($10, NOW()) ELSE NULL END) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(input.project_id)
            .bind(input.client_id)
            .bind(input.amount)
            .bind(&input.currency)
            .bind(input.due_date)
            .bind(input.status.as_str())
            .bind(&input.notes)
            .bind(&input.payment_link)
            .bind(&input.receipt_url)
            .bind(input.paid_at)
            .fetch_one(pool)
            .await
    }

    /// Replace an invoice's editable fields.
    ///
    /// `paid_at` keeps its stored value while the invoice stays PAID and is
    /// cleared when it leaves PAID.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &InvoiceInput,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET project_id = $2, client_id = $3, amount = $4, currency = $5, \
                due_date = $6, status = $7, notes = $8, payment_link = $9, \
                receipt_url = COALESCE($10, receipt_url), \
                paid_at = CASE WHEN $7 = 'PAID' THEN COALESCE($11, paid_at, NOW()) ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(input.client_id)
            .bind(input.amount)
            .bind(&input.currency)
            .bind(input.due_date)
            .bind(input.status.as_str())
            .bind(&input.notes)
            .bind(&input.payment_link)
            .bind(&input.receipt_url)
            .bind(input.paid_at)
            .fetch_optional(pool)
            .await
    }

    /// Attach an uploaded receipt.
    pub async fn set_receipt(
        pool: &PgPool,
        id: DbId,
        url: &str,
        public_id: &str,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET receipt_url = $2, receipt_public_id = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(url)
            .bind(public_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sum of PAID invoice amounts with `paid_at` in `[start, end)` on
    /// projects managed by `manager_id`.
    pub async fn revenue_between(
        pool: &PgPool,
        manager_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(i.amount), 0)::DOUBLE PRECISION \
             FROM invoices i \
             JOIN projects p ON p.id = i.project_id \
             WHERE p.manager_id = $1 AND i.status = 'PAID' \
               AND i.paid_at >= $2 AND i.paid_at < $3",
        )
        .bind(manager_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }
}
