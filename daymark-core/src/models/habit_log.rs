/// Habit log model and database operations
///
/// One row per (habit, date). The unique constraint means a day's state is
/// exactly one of: no row, a row with `is_completed = false`, or a row with
/// `is_completed = true`. The toggle cycle in the service layer walks those
/// three states.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE habit_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     habit_id UUID NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     is_completed BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (habit_id, date)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Habit completion record for one day
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HabitLog {
    /// Unique log ID
    pub id: Uuid,

    /// Habit this log belongs to
    pub habit_id: Uuid,

    /// Calendar date the log covers
    pub date: NaiveDate,

    /// Completion flag
    pub is_completed: bool,

    pub created_at: DateTime<Utc>,
}

impl HabitLog {
    /// Creates a completed log for a day
    pub async fn create(
        pool: &PgPool,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, HabitLog>(
            r#"
            INSERT INTO habit_logs (habit_id, date, is_completed)
            VALUES ($1, $2, TRUE)
            RETURNING id, habit_id, date, is_completed, created_at
            "#,
        )
        .bind(habit_id)
        .bind(date)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Finds the log for a habit on a given date
    pub async fn find_by_habit_and_date(
        pool: &PgPool,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let log = sqlx::query_as::<_, HabitLog>(
            r#"
            SELECT id, habit_id, date, is_completed, created_at
            FROM habit_logs
            WHERE habit_id = $1 AND date = $2
            "#,
        )
        .bind(habit_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;

        Ok(log)
    }

    /// Marks an existing log completed, returning the updated row
    pub async fn mark_completed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let log = sqlx::query_as::<_, HabitLog>(
            r#"
            UPDATE habit_logs
            SET is_completed = TRUE
            WHERE id = $1
            RETURNING id, habit_id, date, is_completed, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(log)
    }

    /// Deletes a log
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habit_logs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all logs for a set of habits, for batch hydration
    pub async fn list_for_habits(
        pool: &PgPool,
        habit_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, HabitLog>(
            r#"
            SELECT id, habit_id, date, is_completed, created_at
            FROM habit_logs
            WHERE habit_id = ANY($1)
            ORDER BY date ASC
            "#,
        )
        .bind(habit_ids)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }

    /// Lists logs for a set of habits within an inclusive date range
    ///
    /// Feeds the weekly grid: one batch query instead of one per habit.
    pub async fn list_for_habits_between(
        pool: &PgPool,
        habit_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, HabitLog>(
            r#"
            SELECT id, habit_id, date, is_completed, created_at
            FROM habit_logs
            WHERE habit_id = ANY($1) AND date >= $2 AND date <= $3
            ORDER BY date ASC
            "#,
        )
        .bind(habit_ids)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }
}
