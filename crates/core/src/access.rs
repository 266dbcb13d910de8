//! Role-based access policy.
//!
//! Listing uses a [`ScopeFilter`]: one rule per (resource, role) pair looked up
//! from a static table, rendered to SQL by the repository layer and evaluated
//! in memory by [`ScopeFilter::matches`]. Single-resource checks are plain
//! decision functions over [`ProjectRelations`]. Nothing here touches storage.

use crate::error::CoreError;
use crate::roles::{Actor, Role};
use crate::types::DbId;

/// Resource families with a role-scoped listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    Task,
    Invoice,
    File,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Project,
        ResourceKind::Task,
        ResourceKind::Invoice,
        ResourceKind::File,
    ];

    fn index(self) -> usize {
        match self {
            ResourceKind::Project => 0,
            ResourceKind::Task => 1,
            ResourceKind::Invoice => 2,
            ResourceKind::File => 3,
        }
    }
}

/// The ownership relation a listing is restricted to.
///
/// Every rule except `InvoiceClient` is evaluated against the owning project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRule {
    /// No restriction.
    Unrestricted,
    /// `project.client_id == actor`.
    ProjectClient,
    /// `invoice.client_id == actor`.
    InvoiceClient,
    /// `project.manager_id == actor`.
    ProjectManager,
    /// Active member of the project's team, or assignee of one of its tasks.
    ProjectParticipant,
}

use ScopeRule::*;

/// Indexed by `[ResourceKind::index()][Role::index()]`, roles in
/// `Role::ALL` order: admin, project manager, team member, client.
const SCOPE_TABLE: [[ScopeRule; 4]; 4] = [
    // Project
    [Unrestricted, ProjectManager, ProjectParticipant, ProjectClient],
    // Task
    [Unrestricted, ProjectManager, ProjectParticipant, ProjectClient],
    // Invoice
    [Unrestricted, ProjectManager, ProjectParticipant, InvoiceClient],
    // File
    [Unrestricted, ProjectManager, ProjectParticipant, ProjectClient],
];

/// Look up the listing rule for one (resource, role) pair.
pub fn scope_rule(resource: ResourceKind, role: Role) -> ScopeRule {
    SCOPE_TABLE[resource.index()][role.index()]
}

/// A listing predicate bound to one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFilter {
    pub rule: ScopeRule,
    pub actor_id: DbId,
}

impl ScopeFilter {
    pub fn for_role(actor_id: DbId, role: Role, resource: ResourceKind) -> Self {
        Self {
            rule: scope_rule(resource, role),
            actor_id,
        }
    }

    pub fn for_actor(actor: &Actor, resource: ResourceKind) -> Result<Self, CoreError> {
        actor.ensure_active()?;
        Ok(Self::for_role(actor.id, actor.role, resource))
    }

    /// Evaluate against a project-rooted record.
    pub fn matches(&self, project: &ProjectRelations) -> bool {
        self.matches_record(project, None)
    }

    /// Evaluate against a record, optionally carrying its own client
    /// (invoices do).
    pub fn matches_record(&self, project: &ProjectRelations, record_client: Option<DbId>) -> bool {
        let me = self.actor_id;
        match self.rule {
            Unrestricted => true,
            ProjectClient => project.client_id == me,
            InvoiceClient => record_client.unwrap_or(project.client_id) == me,
            ProjectManager => project.manager_id == me,
            ProjectParticipant => project.is_participant(me),
        }
    }
}

/// Invoice listing honours an explicit `role` query value.
///
/// The value must be a known role. Non-admins may only ask for their own role;
/// an admin may view the list as any role, scoped to the admin's own id.
pub fn invoice_scope(actor: &Actor, requested_role: Option<&str>) -> Result<ScopeFilter, CoreError> {
    actor.ensure_active()?;
    let role = match requested_role.map(str::trim).filter(|r| !r.is_empty()) {
        None => actor.role,
        Some(raw) => Role::parse(raw)?,
    };
    if role != actor.role && !actor.is_admin() {
        return Err(CoreError::access_denied(format!(
            "Cannot list invoices as {role}"
        )));
    }
    Ok(ScopeFilter::for_role(actor.id, role, ResourceKind::Invoice))
}

// ---------------------------------------------------------------------------
// Single-resource decisions
// ---------------------------------------------------------------------------

/// The ownership facts of one project needed by every access decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRelations {
    pub client_id: DbId,
    pub manager_id: DbId,
    /// User ids of active members of the project's team.
    pub team_member_ids: Vec<DbId>,
    /// Distinct assignees of the project's tasks.
    pub assignee_ids: Vec<DbId>,
}

impl ProjectRelations {
    pub fn is_team_member(&self, user_id: DbId) -> bool {
        self.team_member_ids.contains(&user_id)
    }

    pub fn is_assignee(&self, user_id: DbId) -> bool {
        self.assignee_ids.contains(&user_id)
    }

    pub fn is_participant(&self, user_id: DbId) -> bool {
        self.is_team_member(user_id) || self.is_assignee(user_id)
    }
}

/// Whether the actor may read the project and everything it owns.
pub fn can_read_project(actor: &Actor, project: &ProjectRelations) -> bool {
    if !actor.is_active {
        return false;
    }
    actor.is_admin()
        || project.client_id == actor.id
        || project.manager_id == actor.id
        || project.is_participant(actor.id)
}

pub fn ensure_project_readable(actor: &Actor, project: &ProjectRelations) -> Result<(), CoreError> {
    if can_read_project(actor, project) {
        Ok(())
    } else {
        Err(CoreError::access_denied("You do not have access to this project"))
    }
}

/// File upload and delete.
///
/// Stricter than the file listing: task assignment alone does not grant it.
/// The original uploader may also delete their own file (`uploader_id`).
pub fn can_touch_files(actor: &Actor, project: &ProjectRelations, uploader_id: Option<DbId>) -> bool {
    if !actor.is_active {
        return false;
    }
    actor.is_admin()
        || project.client_id == actor.id
        || project.manager_id == actor.id
        || project.is_team_member(actor.id)
        || uploader_id == Some(actor.id)
}

pub fn ensure_file_access(
    actor: &Actor,
    project: &ProjectRelations,
    uploader_id: Option<DbId>,
) -> Result<(), CoreError> {
    if can_touch_files(actor, project, uploader_id) {
        Ok(())
    } else {
        Err(CoreError::access_denied("You do not have access to this project's files"))
    }
}

/// Team membership changes: admins globally, project managers only on teams
/// they lead.
pub fn can_manage_team(actor: &Actor, team_lead_id: Option<DbId>) -> bool {
    if !actor.is_active {
        return false;
    }
    match actor.role {
        Role::Admin => true,
        Role::ProjectManager => team_lead_id == Some(actor.id),
        Role::TeamMember | Role::Client => false,
    }
}

pub fn ensure_team_manager(actor: &Actor, team_lead_id: Option<DbId>) -> Result<(), CoreError> {
    if can_manage_team(actor, team_lead_id) {
        Ok(())
    } else {
        Err(CoreError::access_denied("You can only manage teams you lead"))
    }
}

/// Team members see projects without their financials.
pub fn can_see_budget(role: Role) -> bool {
    role != Role::TeamMember
}

/// Resolve the manager of a project being created or edited.
///
/// A project manager always becomes the manager, whatever was submitted.
/// Admins must name one.
pub fn resolve_manager(actor: &Actor, requested: Option<DbId>) -> Result<DbId, CoreError> {
    actor.ensure_can_manage()?;
    match actor.role {
        Role::ProjectManager => Ok(actor.id),
        _ => requested.ok_or_else(|| CoreError::invalid_field("manager_id", "Manager is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const ADMIN: DbId = 1;
    const PM: DbId = 2;
    const OTHER_PM: DbId = 3;
    const MEMBER: DbId = 4;
    const ASSIGNEE: DbId = 5;
    const CLIENT: DbId = 6;
    const STRANGER: DbId = 7;

    fn project() -> ProjectRelations {
        ProjectRelations {
            client_id: CLIENT,
            manager_id: PM,
            team_member_ids: vec![MEMBER],
            assignee_ids: vec![ASSIGNEE],
        }
    }

    fn actors() -> Vec<Actor> {
        vec![
            Actor::new(ADMIN, Role::Admin),
            Actor::new(PM, Role::ProjectManager),
            Actor::new(OTHER_PM, Role::ProjectManager),
            Actor::new(MEMBER, Role::TeamMember),
            Actor::new(ASSIGNEE, Role::TeamMember),
            Actor::new(CLIENT, Role::Client),
            Actor::new(STRANGER, Role::TeamMember),
            Actor::new(STRANGER, Role::Client),
        ]
    }

    /// The listing predicate written out per role, independent of the table.
    fn expected_visible(actor: &Actor, p: &ProjectRelations) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Client => p.client_id == actor.id,
            Role::ProjectManager => p.manager_id == actor.id,
            Role::TeamMember => {
                p.team_member_ids.contains(&actor.id) || p.assignee_ids.contains(&actor.id)
            }
        }
    }

    #[test]
    fn project_listing_matches_role_predicate_for_every_actor() {
        let p = project();
        for actor in actors() {
            let filter = ScopeFilter::for_actor(&actor, ResourceKind::Project).unwrap();
            assert_eq!(
                filter.matches(&p),
                expected_visible(&actor, &p),
                "actor {actor:?}"
            );
        }
    }

    #[test]
    fn task_and_file_listings_are_rooted_at_the_project() {
        let p = project();
        for resource in [ResourceKind::Task, ResourceKind::File] {
            for actor in actors() {
                let filter = ScopeFilter::for_actor(&actor, resource).unwrap();
                assert_eq!(filter.matches(&p), expected_visible(&actor, &p));
            }
        }
    }

    #[test]
    fn invoice_client_rule_uses_the_invoice_client() {
        let p = project();
        let filter = ScopeFilter::for_role(STRANGER, Role::Client, ResourceKind::Invoice);
        assert!(filter.matches_record(&p, Some(STRANGER)));
        assert!(!filter.matches_record(&p, Some(CLIENT)));
    }

    #[test]
    fn every_table_cell_is_defined() {
        for resource in ResourceKind::ALL {
            assert_eq!(scope_rule(resource, Role::Admin), ScopeRule::Unrestricted);
            assert_eq!(scope_rule(resource, Role::ProjectManager), ScopeRule::ProjectManager);
            assert_eq!(scope_rule(resource, Role::TeamMember), ScopeRule::ProjectParticipant);
        }
    }

    #[test]
    fn inactive_actor_gets_no_scope() {
        let actor = Actor {
            id: ADMIN,
            role: Role::Admin,
            is_active: false,
        };
        assert_matches!(
            ScopeFilter::for_actor(&actor, ResourceKind::Project),
            Err(CoreError::AccessDenied(_))
        );
        assert!(!can_read_project(&actor, &project()));
    }

    #[test]
    fn single_read_allows_every_stakeholder() {
        let p = project();
        for id in [PM, MEMBER, ASSIGNEE, CLIENT] {
            let role = if id == CLIENT { Role::Client } else { Role::TeamMember };
            assert!(can_read_project(&Actor::new(id, role), &p), "user {id}");
        }
        assert!(can_read_project(&Actor::new(ADMIN, Role::Admin), &p));
        assert_matches!(
            ensure_project_readable(&Actor::new(STRANGER, Role::Client), &p),
            Err(CoreError::AccessDenied(_))
        );
    }

    #[test]
    fn file_access_excludes_assignment_only_members() {
        let p = project();
        assert!(can_touch_files(&Actor::new(MEMBER, Role::TeamMember), &p, None));
        assert!(!can_touch_files(&Actor::new(ASSIGNEE, Role::TeamMember), &p, None));
        // Listing still shows the assignee the files.
        let filter = ScopeFilter::for_role(ASSIGNEE, Role::TeamMember, ResourceKind::File);
        assert!(filter.matches(&p));
    }

    #[test]
    fn uploader_may_touch_their_own_file() {
        let p = project();
        assert!(can_touch_files(
            &Actor::new(ASSIGNEE, Role::TeamMember),
            &p,
            Some(ASSIGNEE)
        ));
    }

    #[test]
    fn team_management_requires_admin_or_lead() {
        assert!(can_manage_team(&Actor::new(ADMIN, Role::Admin), None));
        assert!(can_manage_team(&Actor::new(PM, Role::ProjectManager), Some(PM)));
        assert!(!can_manage_team(&Actor::new(PM, Role::ProjectManager), Some(OTHER_PM)));
        assert!(!can_manage_team(&Actor::new(PM, Role::ProjectManager), None));
        assert!(!can_manage_team(&Actor::new(MEMBER, Role::TeamMember), Some(MEMBER)));
    }

    #[test]
    fn manager_is_forced_to_self() {
        let pm = Actor::new(PM, Role::ProjectManager);
        assert_eq!(resolve_manager(&pm, Some(OTHER_PM)).unwrap(), PM);
        assert_eq!(resolve_manager(&pm, None).unwrap(), PM);
    }

    #[test]
    fn admin_must_name_a_manager() {
        let admin = Actor::new(ADMIN, Role::Admin);
        assert_eq!(resolve_manager(&admin, Some(OTHER_PM)).unwrap(), OTHER_PM);
        assert_matches!(resolve_manager(&admin, None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn non_managers_cannot_resolve_a_manager() {
        let client = Actor::new(CLIENT, Role::Client);
        assert_matches!(resolve_manager(&client, Some(PM)), Err(CoreError::AccessDenied(_)));
    }

    #[test]
    fn only_team_members_lose_budget_visibility() {
        assert!(can_see_budget(Role::Admin));
        assert!(can_see_budget(Role::ProjectManager));
        assert!(can_see_budget(Role::Client));
        assert!(!can_see_budget(Role::TeamMember));
    }

    #[test]
    fn invoice_scope_defaults_to_own_role() {
        let client = Actor::new(CLIENT, Role::Client);
        let filter = invoice_scope(&client, None).unwrap();
        assert_eq!(filter.rule, ScopeRule::InvoiceClient);
        assert_eq!(filter.actor_id, CLIENT);
    }

    #[test]
    fn invoice_scope_rejects_unknown_roles() {
        let admin = Actor::new(ADMIN, Role::Admin);
        assert_matches!(invoice_scope(&admin, Some("OWNER")), Err(CoreError::InvalidRole(_)));
    }

    #[test]
    fn invoice_scope_role_switch_is_admin_only() {
        let admin = Actor::new(ADMIN, Role::Admin);
        let filter = invoice_scope(&admin, Some("CLIENT")).unwrap();
        assert_eq!(filter.rule, ScopeRule::InvoiceClient);

        let member = Actor::new(MEMBER, Role::TeamMember);
        assert_matches!(invoice_scope(&member, Some("ADMIN")), Err(CoreError::AccessDenied(_)));
        assert!(invoice_scope(&member, Some("TEAM_MEMBER")).is_ok());
    }
}
