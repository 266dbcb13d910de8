//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod dashboard_repo;
pub mod file_repo;
pub mod invoice_repo;
pub mod milestone_repo;
pub mod project_repo;
pub mod task_repo;
pub mod team_member_repo;
pub mod team_repo;
pub mod timeline_event_repo;
pub mod user_repo;

pub use dashboard_repo::DashboardRepo;
pub use file_repo::FileRepo;
pub use invoice_repo::InvoiceRepo;
pub use milestone_repo::MilestoneRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use team_member_repo::TeamMemberRepo;
pub use team_repo::TeamRepo;
pub use timeline_event_repo::TimelineEventRepo;
pub use user_repo::UserRepo;
