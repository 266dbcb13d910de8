//! Repository for the `team_members` table.
//!
//! A team has at most one active LEAD. Every write that can produce a LEAD
//! demotes the previous one inside the same transaction, and the partial
//! unique index `uq_team_members_one_lead` rejects anything that slips past.

use agency_core::status::TeamRole;
use agency_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::team::{AddTeamMember, TeamMember, TeamMemberWithUser};

/// Column list for `team_members` queries.
const COLUMNS: &str = "id, user_id, team_id, role, is_active, joined_at, left_at";

/// Provides membership writes that keep the single-LEAD invariant.
pub struct TeamMemberRepo;

impl TeamMemberRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TeamMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM team_members WHERE id = $1");
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active members of a team with their user details, leads first.
    pub async fn list_active_for_team(
        pool: &PgPool,
        team_id: DbId,
    ) -> Result<Vec<TeamMemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, TeamMemberWithUser>(
            "SELECT m.id, m.user_id, m.team_id, m.role, m.is_active, m.joined_at, m.left_at, \
                u.name AS user_name, u.email AS user_email, u.role AS user_role \
             FROM team_members m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.team_id = $1 AND m.is_active \
             ORDER BY (m.role = 'LEAD') DESC, m.joined_at ASC",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// Add a user to a team, or reactivate their previous membership.
    pub async fn add(pool: &PgPool, input: &AddTeamMember) -> Result<TeamMember, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let member = Self::upsert_in(&mut *tx, input.team_id, input.user_id, input.role).await?;
        tx.commit().await?;
        Ok(member)
    }

    /// Add or reactivate several members of one team atomically.
    pub async fn add_many(
        pool: &PgPool,
        team_id: DbId,
        members: &[(DbId, TeamRole)],
    ) -> Result<Vec<TeamMember>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut added = Vec::with_capacity(members.len());
        for &(user_id, role) in members {
            added.push(Self::upsert_in(&mut *tx, team_id, user_id, role).await?);
        }
        tx.commit().await?;
        Ok(added)
    }

    /// Upsert a membership on an open connection.
    ///
    /// Re-adding a user reactivates their row and clears `left_at`; an
    /// active row keeps its original `joined_at`.
    pub async fn upsert_in(
        conn: &mut PgConnection,
        team_id: DbId,
        user_id: DbId,
        role: TeamRole,
    ) -> Result<TeamMember, sqlx::Error> {
        if role == TeamRole::Lead {
            Self::demote_lead_in(&mut *conn, team_id, user_id).await?;
        }
        let query = format!(
            "INSERT INTO team_members (user_id, team_id, role) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, team_id) DO UPDATE SET \
                role = EXCLUDED.role, \
                is_active = TRUE, \
                left_at = NULL, \
                joined_at = CASE WHEN team_members.is_active \
                    THEN team_members.joined_at ELSE NOW() END \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(user_id)
            .bind(team_id)
            .bind(role.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    /// Change an active member's role. Promoting to LEAD demotes the current
    /// lead in the same transaction.
    ///
    /// Returns `None` when the row is missing or no longer active.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role: TeamRole,
    ) -> Result<Option<TeamMember>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let target = sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT team_id, user_id FROM team_members WHERE id = $1 AND is_active FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((team_id, user_id)) = target else {
            return Ok(None);
        };

        if role == TeamRole::Lead {
            Self::demote_lead_in(&mut *tx, team_id, user_id).await?;
        }

        let query = format!("UPDATE team_members SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let member = sqlx::query_as::<_, TeamMember>(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(member))
    }

    /// Mark a membership as left. The row is kept for history.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<TeamMember>, sqlx::Error> {
        let query = format!(
            "UPDATE team_members SET is_active = FALSE, \
                left_at = COALESCE(left_at, NOW()) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    async fn demote_lead_in(
        conn: &mut PgConnection,
        team_id: DbId,
        except_user: DbId,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_members SET role = 'MEMBER' \
             WHERE team_id = $1 AND role = 'LEAD' AND is_active AND user_id <> $2",
        )
        .bind(team_id)
        .bind(except_user)
        .execute(conn)
        .await?;
        if result.rows_affected() > 0 {
            tracing::debug!(team_id, "Demoted previous team lead");
        }
        Ok(())
    }
}
