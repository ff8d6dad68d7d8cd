/// Database models for Daymark
///
/// This module contains all database models and their CRUD queries. Every
/// query that reads or writes user-owned data filters on the owner's id;
/// cross-user rows are invisible at this layer.
///
/// # Models
///
/// - `user`: User accounts (local credentials or external identity provider)
/// - `project`: Projects grouping tasks, with color and active/archived status
/// - `task`: Tasks with priority, status, category, and optional date range
/// - `subtask`: Checklist items under a task
/// - `comment`: Immutable comments on a task
/// - `habit`: Recurring habits with a weekday frequency set
/// - `habit_log`: Per-day habit completion records, unique per (habit, date)

pub mod comment;
pub mod habit;
pub mod habit_log;
pub mod project;
pub mod subtask;
pub mod task;
pub mod user;
