/// Task model and database operations
///
/// Tasks are the central entity: they belong to a user, optionally to a
/// project, and own subtasks and comments (both cascade-deleted with the
/// task).
///
/// # Status
///
/// The four known statuses are TODO, IN_PROGRESS, REVIEW, and DONE, but the
/// column is TEXT and the status-toggle endpoint stores whatever value the
/// client sends. [`TaskStatus`] therefore only models the known values;
/// anything else is carried verbatim and ignored by the board view.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
///     title VARCHAR(500) NOT NULL,
///     description TEXT,
///     priority TEXT NOT NULL DEFAULT 'MEDIUM',
///     status TEXT NOT NULL DEFAULT 'TODO',
///     start_date DATE,
///     end_date DATE,
///     category TEXT NOT NULL DEFAULT 'PERSONAL',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// The four known task statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Review => "REVIEW",
            TaskStatus::Done => "DONE",
        }
    }

    /// Parses a stored status string; None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(TaskStatus::Todo),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "REVIEW" => Some(TaskStatus::Review),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// All known statuses in lifecycle order
    pub fn all() -> [TaskStatus; 4] {
        [
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Review,
            TaskStatus::Done,
        ]
    }
}

/// SQL expression ranking priorities HIGH > MEDIUM > LOW; unknown values last
const PRIORITY_RANK: &str =
    "CASE priority WHEN 'HIGH' THEN 3 WHEN 'MEDIUM' THEN 2 WHEN 'LOW' THEN 1 ELSE 0 END";

/// SQL expression ranking statuses in lifecycle order; unknown values last
const STATUS_RANK: &str = "CASE status WHEN 'TODO' THEN 0 WHEN 'IN_PROGRESS' THEN 1 \
     WHEN 'REVIEW' THEN 2 WHEN 'DONE' THEN 3 ELSE 4 END";

const TASK_COLUMNS: &str = "id, user_id, project_id, title, description, priority, status, \
     start_date, end_date, category, created_at, updated_at";

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Optional parent project (cleared when the project is deleted)
    pub project_id: Option<Uuid>,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// "LOW" | "MEDIUM" | "HIGH"
    pub priority: String,

    /// Status string, usually one of the [`TaskStatus`] values but stored
    /// verbatim
    pub status: String,

    /// Optional start date (calendar date, no time)
    pub start_date: Option<NaiveDate>,

    /// Optional end date
    pub end_date: Option<NaiveDate>,

    /// "PERSONAL" | "WORK" | "PROJECT"
    pub category: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// Priority, status, and category fall back to their column defaults when
/// None.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
}

/// Input for updating a task; only non-None fields are written
///
/// Nested options distinguish "leave unchanged" (outer None) from "clear the
/// column" (Some(None)).
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub project_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub category: Option<String>,
}

/// Filters for the task list endpoint
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub category: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<Uuid>,
    pub priority: Option<String>,
}

impl Task {
    /// Creates a new task
    ///
    /// Takes an executor so callers can run it inside a transaction with
    /// inline subtask creation.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, project_id, title, description, priority, status,
                               start_date, end_date, category)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'MEDIUM'), COALESCE($6, 'TODO'),
                    $7, $8, COALESCE($9, 'PERSONAL'))
            RETURNING id, user_id, project_id, title, description, priority, status,
                      start_date, end_date, category, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.category)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID without owner scoping
    ///
    /// Only for resolving ownership transitively (subtask operations); API
    /// reads go through [`Task::find_by_id_and_user`].
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks with optional filters
    ///
    /// Ordered by start date ascending (NULLs last), then priority
    /// descending.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        filters: &TaskFilters,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
        let mut bind_count = 1;

        if filters.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND category = ${}", bind_count));
        }
        if filters.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filters.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND project_id = ${}", bind_count));
        }
        if filters.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND priority = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY start_date ASC NULLS LAST, {PRIORITY_RANK} DESC"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);

        if let Some(ref category) = filters.category {
            q = q.bind(category.clone());
        }
        if let Some(ref status) = filters.status {
            q = q.bind(status.clone());
        }
        if let Some(project_id) = filters.project_id {
            q = q.bind(project_id);
        }
        if let Some(ref priority) = filters.priority {
            q = q.bind(priority.clone());
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Lists a user's tasks matching a calendar date
    ///
    /// A task matches when its start date equals the date, or the date falls
    /// within [start_date, end_date] inclusive. Tasks without a start date
    /// never match.
    pub async fn list_by_date(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
              AND (start_date = $2 OR (start_date <= $2 AND end_date >= $2))
            ORDER BY {PRIORITY_RANK} DESC, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists unfinished tasks starting within (from, from + days]
    pub async fn list_upcoming(
        pool: &PgPool,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
              AND start_date > $2 AND start_date <= $3
              AND status <> 'DONE'
            ORDER BY start_date ASC, {PRIORITY_RANK} DESC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists a project's tasks, optionally filtered by status
    ///
    /// Ordered by status lifecycle rank, then priority descending, then
    /// start date.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        status: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 AND user_id = $2"
        );
        if status.is_some() {
            query.push_str(" AND status = $3");
        }
        query.push_str(&format!(
            " ORDER BY {STATUS_RANK} ASC, {PRIORITY_RANK} DESC, start_date ASC NULLS LAST"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(project_id).bind(user_id);
        if let Some(status) = status {
            q = q.bind(status.to_string());
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Lists a project's tasks for the board view
    ///
    /// Ordered by priority descending, then creation time, so each status
    /// bucket comes out pre-sorted.
    pub async fn list_for_board(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1 AND user_id = $2
            ORDER BY {PRIORITY_RANK} DESC, created_at ASC
            "#
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists a project's dated tasks for the gantt view, earliest first
    pub async fn list_with_dates_by_project(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1 AND user_id = $2 AND start_date IS NOT NULL
            ORDER BY start_date ASC
            "#
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, scoped to its owner
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_id = ${}", bind_count));
        }
        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }
        if data.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(user_id);

        if let Some(project_id) = data.project_id {
            q = q.bind(project_id);
        }
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }
        if let Some(category) = data.category {
            q = q.bind(category);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Overwrites the status column
    ///
    /// No transition validation: the value is stored verbatim. Takes an
    /// executor so the subtask-completion promotion can run in the same
    /// transaction as the subtask flip.
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task, scoped to its owner
    ///
    /// Subtasks and comments go with it via CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts a project's tasks
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Counts a project's tasks in a given status
    pub async fn count_by_project_and_status(
        pool: &PgPool,
        project_id: Uuid,
        status: &str,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = $1 AND status = $2")
                .bind(project_id)
                .bind(status)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "TODO");
        assert_eq!(TaskStatus::InProgress.as_str(), "IN_PROGRESS");
        assert_eq!(TaskStatus::Review.as_str(), "REVIEW");
        assert_eq!(TaskStatus::Done.as_str(), "DONE");
    }

    #[test]
    fn test_task_status_parse_roundtrip() {
        for status in TaskStatus::all() {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_task_status_parse_unknown() {
        assert_eq!(TaskStatus::parse("BLOCKED"), None);
        assert_eq!(TaskStatus::parse("todo"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }

    #[test]
    fn test_task_filters_default_is_empty() {
        let filters = TaskFilters::default();
        assert!(filters.category.is_none());
        assert!(filters.status.is_none());
        assert!(filters.project_id.is_none());
        assert!(filters.priority.is_none());
    }
}
