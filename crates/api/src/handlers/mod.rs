pub mod dashboard;
pub mod file;
pub mod invoice;
pub mod milestone;
pub mod project;
pub mod project_team;
pub mod task;
pub mod team;
pub mod team_member;
pub mod timeline_event;
pub mod upload;
pub mod user;
