/// Subtask model and database operations
///
/// Subtasks are checklist items under a task. They have no owner column of
/// their own; ownership is resolved through the parent task.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subtasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     title VARCHAR(500) NOT NULL,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Subtask model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subtask {
    /// Unique subtask ID
    pub id: Uuid,

    /// Parent task
    pub task_id: Uuid,

    /// Checklist item text
    pub title: String,

    /// Completion flag
    pub is_completed: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subtask {
    /// Creates a subtask under a task
    ///
    /// Executor-generic so inline subtask creation can share the task's
    /// insert transaction.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: Uuid,
        title: &str,
    ) -> Result<Self, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO subtasks (task_id, title)
            VALUES ($1, $2)
            RETURNING id, task_id, title, is_completed, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(title)
        .fetch_one(executor)
        .await?;

        Ok(subtask)
    }

    /// Finds a subtask by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, title, is_completed, created_at, updated_at
            FROM subtasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subtask)
    }

    /// Lists a task's subtasks in creation order
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let subtasks = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, title, is_completed, created_at, updated_at
            FROM subtasks
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(subtasks)
    }

    /// Lists subtasks for a set of tasks, for batch hydration
    pub async fn list_by_tasks(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let subtasks = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, title, is_completed, created_at, updated_at
            FROM subtasks
            WHERE task_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await?;

        Ok(subtasks)
    }

    /// Sets the completion flag, returning the updated row
    ///
    /// Executor-generic so the flip and any resulting task promotion share
    /// a transaction.
    pub async fn set_completed<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        is_completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            UPDATE subtasks
            SET is_completed = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_id, title, is_completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(is_completed)
        .fetch_optional(executor)
        .await?;

        Ok(subtask)
    }

    /// Deletes a subtask
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
