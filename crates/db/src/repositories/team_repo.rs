//! Repository for the `teams` table.

use agency_core::types::DbId;
use sqlx::PgPool;

use crate::models::team::{ManagedTeamMember, Team, TeamInput, TeamOption, TeamSummary};
use crate::repositories::team_member_repo::TeamMemberRepo;

/// Column list for `teams` queries.
const COLUMNS: &str = "id, name, description, team_lead_id, is_active, created_at, updated_at";

/// Project statuses that no longer count as active work.
const CLOSED_PROJECT_STATUSES: &str = "('COMPLETED', 'ARCHIVED', 'CANCELLED')";

/// Provides CRUD operations for teams and their membership roster.
pub struct TeamRepo;

impl TeamRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All teams with lead name, active member count and active project
    /// count, newest first.
    pub async fn list_with_stats(pool: &PgPool) -> Result<Vec<TeamSummary>, sqlx::Error> {
        let query = format!(
            "SELECT t.id, t.name, t.description, t.team_lead_id, t.is_active, \
                t.created_at, t.updated_at, \
                (SELECT u.name FROM team_members lm JOIN users u ON u.id = lm.user_id \
                 WHERE lm.team_id = t.id AND lm.role = 'LEAD' AND lm.is_active \
                 LIMIT 1) AS lead_name, \
                (SELECT COUNT(*) FROM team_members m \
                 WHERE m.team_id = t.id AND m.is_active) AS member_count, \
                (SELECT COUNT(*) FROM projects p \
                 WHERE p.team_id = t.id AND p.status NOT IN {CLOSED_PROJECT_STATUSES}) \
                    AS active_project_count \
             FROM teams t \
             ORDER BY t.created_at DESC"
        );
        sqlx::query_as::<_, TeamSummary>(&query).fetch_all(pool).await
    }

    /// Active teams for form pickers.
    pub async fn list_options(pool: &PgPool) -> Result<Vec<TeamOption>, sqlx::Error> {
        sqlx::query_as::<_, TeamOption>(
            "SELECT id, name FROM teams WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Create a team and its initial members in one transaction.
    pub async fn create(pool: &PgPool, input: &TeamInput) -> Result<Team, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO teams (name, description, is_active, team_lead_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_active)
            .bind(input.lead_id)
            .fetch_one(&mut *tx)
            .await?;

        for &user_id in &input.member_ids {
            TeamMemberRepo::upsert_in(&mut *tx, team.id, user_id, input.role_for(user_id)).await?;
        }

        tx.commit().await?;
        Ok(team)
    }

    /// Replace a team's details and roster.
    ///
    /// Members missing from the new roster are deactivated, listed members
    /// are upserted with their new role.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &TeamInput,
    ) -> Result<Option<Team>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE teams SET name = $2, description = $3, is_active = $4, team_lead_id = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let Some(team) = sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_active)
            .bind(input.lead_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE team_members SET is_active = FALSE, left_at = NOW() \
             WHERE team_id = $1 AND is_active AND NOT (user_id = ANY($2))",
        )
        .bind(id)
        .bind(&input.member_ids)
        .execute(&mut *tx)
        .await?;

        for &user_id in &input.member_ids {
            TeamMemberRepo::upsert_in(&mut *tx, id, user_id, input.role_for(user_id)).await?;
        }

        tx.commit().await?;
        Ok(Some(team))
    }

    /// Delete a team. Projects referencing it keep existing without a team.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active members of the active teams `lead_id` leads, with task
    /// statistics restricted to projects `lead_id` manages.
    pub async fn managed_members(
        pool: &PgPool,
        lead_id: DbId,
    ) -> Result<Vec<ManagedTeamMember>, sqlx::Error> {
        let query = format!(
            "SELECT m.id, m.user_id, u.name, u.email, m.role, t.id AS team_id, \
                t.name AS team_name, m.joined_at, \
                (SELECT COUNT(*) FROM tasks x JOIN projects xp ON xp.id = x.project_id \
                 WHERE x.assignee_id = m.user_id AND xp.manager_id = $1 \
                   AND x.status IN ('PENDING', 'IN_PROGRESS')) AS active_tasks, \
                (SELECT COUNT(*) FROM tasks x JOIN projects xp ON xp.id = x.project_id \
                 WHERE x.assignee_id = m.user_id AND xp.manager_id = $1 \
                   AND x.status = 'COMPLETED') AS completed_tasks, \
                ARRAY(SELECT p.name FROM projects p \
                      WHERE p.manager_id = $1 \
                        AND p.status NOT IN {CLOSED_PROJECT_STATUSES} \
                        AND (p.team_id = t.id OR EXISTS (SELECT 1 FROM tasks y \
                             WHERE y.project_id = p.id AND y.assignee_id = m.user_id)) \
                      ORDER BY p.name) AS current_projects \
             FROM teams t \
             JOIN team_members m ON m.team_id = t.id AND m.is_active \
             JOIN users u ON u.id = m.user_id \
             WHERE t.team_lead_id = $1 AND t.is_active \
             ORDER BY t.created_at DESC, m.joined_at ASC"
        );
        sqlx::query_as::<_, ManagedTeamMember>(&query)
            .bind(lead_id)
            .fetch_all(pool)
            .await
    }
}
