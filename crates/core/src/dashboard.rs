//! Project-manager dashboard fold.
//!
//! The repository layer fetches the inputs (concurrently, all-or-nothing);
//! [`summarize`] turns them into the response without further I/O.

use std::collections::HashSet;

use serde::Serialize;

use crate::progress::{due_info, growth, percentage, progress};
use crate::roles::Role;
use crate::status::{ProjectStatus, TaskStatus};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// An active project managed by the actor, ordered by due date.
#[derive(Debug, Clone)]
pub struct ManagedProject {
    pub id: DbId,
    pub name: String,
    pub status: ProjectStatus,
    pub due_date: Option<Timestamp>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

/// Any task on any project managed by the actor.
#[derive(Debug, Clone)]
pub struct ManagedTask {
    pub assignee_id: Option<DbId>,
    pub status: TaskStatus,
}

/// One active membership on a team attached to a managed project.
/// A user on several such teams appears once per team.
#[derive(Debug, Clone)]
pub struct ActiveMembership {
    pub user_id: DbId,
    pub name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardInputs {
    pub projects: Vec<ManagedProject>,
    pub tasks: Vec<ManagedTask>,
    pub memberships: Vec<ActiveMembership>,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    /// Managed projects created during the previous calendar month.
    pub last_month_new_projects: i64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub active_projects: i64,
    pub team_members: i64,
    pub pending_tasks: i64,
    pub revenue: f64,
    pub previous_revenue: f64,
    pub project_growth: i64,
    pub revenue_growth: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardProject {
    pub id: DbId,
    pub name: String,
    pub status: ProjectStatus,
    pub progress: i64,
    pub due_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberPerformance {
    pub user_id: DbId,
    pub name: String,
    pub role: Role,
    pub completion_rate: i64,
    pub completed_tasks: i64,
    pub total_tasks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerDashboard {
    pub stats: DashboardStats,
    pub projects: Vec<DashboardProject>,
    pub team_performance: Vec<MemberPerformance>,
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

pub fn summarize(inputs: DashboardInputs, now: Timestamp) -> ManagerDashboard {
    let active_projects = inputs.projects.len() as i64;
    let pending_tasks = inputs
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .count() as i64;

    let mut seen = HashSet::new();
    let members: Vec<&ActiveMembership> = inputs
        .memberships
        .iter()
        .filter(|m| seen.insert(m.user_id))
        .collect();

    let stats = DashboardStats {
        active_projects,
        team_members: members.len() as i64,
        pending_tasks,
        revenue: inputs.current_revenue,
        previous_revenue: inputs.previous_revenue,
        project_growth: growth(active_projects as f64, inputs.last_month_new_projects as f64),
        revenue_growth: growth(inputs.current_revenue, inputs.previous_revenue),
    };

    let projects = inputs
        .projects
        .iter()
        .map(|p| DashboardProject {
            id: p.id,
            name: p.name.clone(),
            status: p.status,
            progress: progress(p.completed_tasks, p.total_tasks),
            due_info: due_info(p.due_date, now),
        })
        .collect();

    let team_performance = members
        .into_iter()
        .filter_map(|m| {
            let assigned = inputs.tasks.iter().filter(|t| t.assignee_id == Some(m.user_id));
            let (total, completed) = assigned.fold((0i64, 0i64), |(total, done), t| {
                (total + 1, done + i64::from(t.status == TaskStatus::Completed))
            });
            (total > 0).then(|| MemberPerformance {
                user_id: m.user_id,
                name: m.name.clone().unwrap_or_else(|| "Unknown".to_string()),
                role: m.role,
                completion_rate: percentage(completed as f64, total as f64),
                completed_tasks: completed,
                total_tasks: total,
            })
        })
        .collect();

    ManagerDashboard {
        stats,
        projects,
        team_performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn task(assignee: Option<DbId>, status: TaskStatus) -> ManagedTask {
        ManagedTask {
            assignee_id: assignee,
            status,
        }
    }

    fn member(user_id: DbId, name: &str) -> ActiveMembership {
        ActiveMembership {
            user_id,
            name: Some(name.to_string()),
            role: Role::TeamMember,
        }
    }

    #[test]
    fn empty_inputs_produce_zeroes() {
        let dash = summarize(DashboardInputs::default(), now());
        assert_eq!(dash.stats.active_projects, 0);
        assert_eq!(dash.stats.project_growth, 0);
        assert_eq!(dash.stats.revenue_growth, 0);
        assert!(dash.projects.is_empty());
        assert!(dash.team_performance.is_empty());
    }

    #[test]
    fn revenue_growth_uses_previous_month() {
        let dash = summarize(
            DashboardInputs {
                current_revenue: 500.0,
                previous_revenue: 300.0,
                ..Default::default()
            },
            now(),
        );
        assert_eq!(dash.stats.revenue, 500.0);
        assert_eq!(dash.stats.previous_revenue, 300.0);
        assert_eq!(dash.stats.revenue_growth, 67);
    }

    #[test]
    fn member_on_two_teams_counts_once() {
        let dash = summarize(
            DashboardInputs {
                memberships: vec![member(10, "Ana"), member(11, "Ben"), member(10, "Ana")],
                tasks: vec![task(Some(10), TaskStatus::Completed)],
                ..Default::default()
            },
            now(),
        );
        assert_eq!(dash.stats.team_members, 2);
        assert_eq!(dash.team_performance.len(), 1);
    }

    #[test]
    fn project_growth_compares_active_count_to_last_month_creations() {
        let project = |id| ManagedProject {
            id,
            name: format!("P{id}"),
            status: ProjectStatus::InProgress,
            due_date: None,
            total_tasks: 0,
            completed_tasks: 0,
        };
        let dash = summarize(
            DashboardInputs {
                projects: vec![project(1), project(2), project(3)],
                last_month_new_projects: 2,
                ..Default::default()
            },
            now(),
        );
        assert_eq!(dash.stats.active_projects, 3);
        assert_eq!(dash.stats.project_growth, 50);
        assert_eq!(dash.projects[0].due_info, "No due date");
    }

    #[test]
    fn project_cards_carry_progress_and_due_label() {
        let dash = summarize(
            DashboardInputs {
                projects: vec![ManagedProject {
                    id: 7,
                    name: "Site".into(),
                    status: ProjectStatus::Review,
                    due_date: Some(Utc.with_ymd_and_hms(2026, 6, 18, 12, 0, 0).unwrap()),
                    total_tasks: 4,
                    completed_tasks: 3,
                }],
                ..Default::default()
            },
            now(),
        );
        let card = &dash.projects[0];
        assert_eq!(card.progress, 75);
        assert_eq!(card.due_info, "Due in 3 days");
    }

    #[test]
    fn pending_tasks_and_performance() {
        let dash = summarize(
            DashboardInputs {
                memberships: vec![member(10, "Ana"), member(11, "Ben")],
                tasks: vec![
                    task(Some(10), TaskStatus::Completed),
                    task(Some(10), TaskStatus::Completed),
                    task(Some(10), TaskStatus::Pending),
                    task(None, TaskStatus::Pending),
                    task(Some(99), TaskStatus::InProgress),
                ],
                ..Default::default()
            },
            now(),
        );
        assert_eq!(dash.stats.pending_tasks, 2);
        // Ben has no tasks and is left out.
        assert_eq!(
            dash.team_performance,
            vec![MemberPerformance {
                user_id: 10,
                name: "Ana".into(),
                role: Role::TeamMember,
                completion_rate: 67,
                completed_tasks: 2,
                total_tasks: 3,
            }]
        );
    }
}
