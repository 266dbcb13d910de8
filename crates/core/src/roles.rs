//! Global user roles and the authenticated actor.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Global role carried on every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    ProjectManager,
    TeamMember,
    Client,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::ProjectManager,
        Role::TeamMember,
        Role::Client,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::ProjectManager => "PROJECT_MANAGER",
            Role::TeamMember => "TEAM_MEMBER",
            Role::Client => "CLIENT",
        }
    }

    /// Parse a role label. Anything outside the closed set is `InvalidRole`.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "ADMIN" => Ok(Role::Admin),
            "PROJECT_MANAGER" => Ok(Role::ProjectManager),
            "TEAM_MEMBER" => Ok(Role::TeamMember),
            "CLIENT" => Ok(Role::Client),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }

    /// Admins and project managers may create and change work items.
    pub fn can_manage(self) -> bool {
        matches!(self, Role::Admin | Role::ProjectManager)
    }

    /// Position in `Role::ALL`, used to index policy tables.
    pub(crate) fn index(self) -> usize {
        match self {
            Role::Admin => 0,
            Role::ProjectManager => 1,
            Role::TeamMember => 2,
            Role::Client => 3,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::parse(&value)
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
    pub role: Role,
    pub is_active: bool,
}

impl Actor {
    pub fn new(id: DbId, role: Role) -> Self {
        Self {
            id,
            role,
            is_active: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Deactivated accounts are denied everything.
    pub fn ensure_active(&self) -> Result<(), CoreError> {
        if self.is_active {
            Ok(())
        } else {
            Err(CoreError::access_denied("Account is deactivated"))
        }
    }

    pub fn ensure_can_manage(&self) -> Result<(), CoreError> {
        self.ensure_active()?;
        if self.role.can_manage() {
            Ok(())
        } else {
            Err(CoreError::access_denied(
                "Only admins and project managers can perform this action",
            ))
        }
    }

    pub fn ensure_admin(&self) -> Result<(), CoreError> {
        self.ensure_active()?;
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::access_denied("Admin role required"))
        }
    }

    pub fn ensure_role(&self, role: Role) -> Result<(), CoreError> {
        self.ensure_active()?;
        if self.role == role {
            Ok(())
        } else {
            Err(CoreError::access_denied(format!("{role} role required")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_every_role() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_invalid_role() {
        assert_matches!(Role::parse("SUPERUSER"), Err(CoreError::InvalidRole(r)) if r == "SUPERUSER");
    }

    #[test]
    fn index_matches_position_in_all() {
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn inactive_actor_is_denied_even_as_admin() {
        let actor = Actor {
            id: 1,
            role: Role::Admin,
            is_active: false,
        };
        assert_matches!(actor.ensure_admin(), Err(CoreError::AccessDenied(_)));
        assert_matches!(actor.ensure_can_manage(), Err(CoreError::AccessDenied(_)));
    }

    #[test]
    fn only_admin_and_manager_can_manage() {
        assert!(Actor::new(1, Role::Admin).ensure_can_manage().is_ok());
        assert!(Actor::new(2, Role::ProjectManager).ensure_can_manage().is_ok());
        assert!(Actor::new(3, Role::TeamMember).ensure_can_manage().is_err());
        assert!(Actor::new(4, Role::Client).ensure_can_manage().is_err());
    }
}
