//! Read access to the identity provider's `users` directory.

use agency_core::roles::Role;
use sqlx::PgPool;

use crate::models::user::{NewUser, User, UserSummary};

/// Column list for `users` queries.
const COLUMNS: &str = "id, name, email, role, is_active, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Active users holding any of `roles`, ordered by name.
    pub async fn list_active_by_roles(
        pool: &PgPool,
        roles: &[Role],
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let labels: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, role FROM users \
             WHERE is_active AND role = ANY($1) \
             ORDER BY name ASC NULLS LAST, id ASC",
        )
        .bind(&labels)
        .fetch_all(pool)
        .await
    }

    /// Insert a directory entry. Accounts are normally provisioned by the
    /// identity provider; this exists for seeding.
    pub async fn create(pool: &PgPool, input: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, role, is_active) VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }
}
