//! Team and team-membership models and payloads.

use agency_core::error::CoreError;
use agency_core::roles::Role;
use agency_core::status::TeamRole;
use agency_core::types::{DbId, Timestamp};
use agency_core::validation::{non_blank, FieldErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub team_lead_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Admin listing entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub team: Team,
    pub lead_name: Option<String>,
    pub member_count: i64,
    /// Projects on this team that are not completed, archived, or cancelled.
    pub active_project_count: i64,
}

/// Team choice offered by the project form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamOption {
    pub id: DbId,
    pub name: String,
}

/// A row from the `team_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMember {
    pub id: DbId,
    pub user_id: DbId,
    pub team_id: DbId,
    #[sqlx(try_from = "String")]
    pub role: TeamRole,
    pub is_active: bool,
    pub joined_at: Timestamp,
    pub left_at: Option<Timestamp>,
}

/// A membership joined with the member's account details.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMemberWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub member: TeamMember,
    pub user_name: Option<String>,
    pub user_email: String,
    #[sqlx(try_from = "String")]
    pub user_role: Role,
}

/// A member of a team led by the requesting project manager, with workload
/// figures restricted to that manager's projects.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ManagedTeamMember {
    pub id: DbId,
    pub user_id: DbId,
    pub name: Option<String>,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: TeamRole,
    pub team_id: DbId,
    pub team_name: String,
    pub joined_at: Timestamp,
    pub active_tasks: i64,
    pub completed_tasks: i64,
    pub current_projects: Vec<String>,
}

// ---------------------------------------------------------------------------
// Team payload (admin)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TeamPayload {
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub lead_id: Option<DbId>,
    /// Users to place on the team. The lead is added even if not listed.
    pub member_ids: Vec<DbId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamInput {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub lead_id: Option<DbId>,
    pub member_ids: Vec<DbId>,
}

impl TeamInput {
    /// Team role for `user_id` under this input.
    pub fn role_for(&self, user_id: DbId) -> TeamRole {
        if self.lead_id == Some(user_id) {
            TeamRole::Lead
        } else {
            TeamRole::Member
        }
    }
}

impl TeamPayload {
    pub fn into_input(self) -> Result<TeamInput, CoreError> {
        let mut errors = FieldErrors::from_validator(self.validate());
        let name = errors.require("name", non_blank(self.name), "Name is required");
        errors.into_result()?;

        let mut member_ids = self.member_ids;
        if let Some(lead) = self.lead_id {
            member_ids.push(lead);
        }
        member_ids.sort_unstable();
        member_ids.dedup();

        name.map(|name| TeamInput {
            name,
            description: non_blank(self.description),
            is_active: self.is_active.unwrap_or(true),
            lead_id: self.lead_id,
            member_ids,
        })
        .ok_or_else(|| CoreError::Internal("team payload accepted without name".into()))
    }
}

// ---------------------------------------------------------------------------
// Membership payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamMemberPayload {
    pub user_id: Option<DbId>,
    pub team_id: Option<DbId>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddTeamMember {
    pub user_id: DbId,
    pub team_id: DbId,
    pub role: TeamRole,
}

impl TeamMemberPayload {
    pub fn into_input(self) -> Result<AddTeamMember, CoreError> {
        let mut errors = FieldErrors::new();
        let user_id = errors.require("user_id", self.user_id, "User is required");
        let team_id = errors.require("team_id", self.team_id, "Team is required");
        let role = match non_blank(self.role) {
            Some(r) => errors.check(TeamRole::parse_field(&r)),
            None => Some(TeamRole::default()),
        };
        errors.into_result()?;
        match (user_id, team_id, role) {
            (Some(user_id), Some(team_id), Some(role)) => Ok(AddTeamMember {
                user_id,
                team_id,
                role,
            }),
            _ => Err(CoreError::Internal("member payload accepted with missing fields".into())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolePayload {
    pub role: Option<String>,
}

impl RolePayload {
    pub fn into_role(self) -> Result<TeamRole, CoreError> {
        let raw = non_blank(self.role)
            .ok_or_else(|| CoreError::invalid_field("role", "Role is required"))?;
        TeamRole::parse_field(&raw).map_err(|e| CoreError::Validation(vec![e]))
    }
}

/// A member to place on a project's team.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberAssignment {
    pub user_id: DbId,
    pub role: Option<String>,
}

/// Body of `PUT /projects/{id}/team`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProjectTeamAction {
    AddMembers { members: Vec<MemberAssignment> },
    RemoveMember { member_id: DbId },
    UpdateRole { member_id: DbId, role: String },
}

impl MemberAssignment {
    pub fn team_role(&self) -> Result<TeamRole, CoreError> {
        match non_blank(self.role.clone()) {
            Some(r) => TeamRole::parse_field(&r).map_err(|e| CoreError::Validation(vec![e])),
            None => Ok(TeamRole::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn lead_is_always_a_member() {
        let input = TeamPayload {
            name: Some("Design".into()),
            lead_id: Some(5),
            member_ids: vec![3, 5, 3],
            ..Default::default()
        }
        .into_input()
        .unwrap();
        assert_eq!(input.member_ids, vec![3, 5]);
        assert_eq!(input.role_for(5), TeamRole::Lead);
        assert_eq!(input.role_for(3), TeamRole::Member);
        assert!(input.is_active);
    }

    #[test]
    fn short_team_name_is_rejected() {
        let err = TeamPayload {
            name: Some("A".into()),
            ..Default::default()
        }
        .into_input()
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref f) if f[0].field == "name");
    }

    #[test]
    fn member_role_defaults_to_member() {
        let add = TeamMemberPayload {
            user_id: Some(1),
            team_id: Some(2),
            role: None,
        }
        .into_input()
        .unwrap();
        assert_eq!(add.role, TeamRole::Member);
    }

    #[test]
    fn team_actions_are_tagged() {
        let action: ProjectTeamAction =
            serde_json::from_str(r#"{"action":"update_role","member_id":4,"role":"LEAD"}"#).unwrap();
        assert_matches!(action, ProjectTeamAction::UpdateRole { member_id: 4, ref role } if role == "LEAD");

        let add: ProjectTeamAction = serde_json::from_str(
            r#"{"action":"add_members","members":[{"user_id":1},{"user_id":2,"role":"LEAD"}]}"#,
        )
        .unwrap();
        match add {
            ProjectTeamAction::AddMembers { members } => {
                assert_eq!(members[0].team_role().unwrap(), TeamRole::Member);
                assert_eq!(members[1].team_role().unwrap(), TeamRole::Lead);
            }
            other => panic!("unexpected action {other:?}"),
        }

        assert!(serde_json::from_str::<ProjectTeamAction>(r#"{"action":"disband"}"#).is_err());
    }

    #[test]
    fn role_payload_rejects_unknown_role() {
        assert_matches!(
            RolePayload { role: Some("OWNER".into()) }.into_role(),
            Err(CoreError::Validation(_))
        );
        assert_eq!(
            RolePayload { role: Some("LEAD".into()) }.into_role().unwrap(),
            TeamRole::Lead
        );
    }
}
