/// Habit model and database operations
///
/// A habit is a recurring item the user intends to do on certain weekdays.
/// The frequency set uses JS-style day indices: 0 = Sunday through
/// 6 = Saturday. An empty set is allowed and simply means the habit is never
/// scheduled.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE habits (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     frequency INT[] NOT NULL DEFAULT '{0,1,2,3,4,5,6}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Habit model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habit {
    /// Unique habit ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Habit name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Scheduled weekdays, 0 = Sunday .. 6 = Saturday
    pub frequency: Vec<i32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a habit
#[derive(Debug, Clone)]
pub struct CreateHabit {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// Defaults to every day when None
    pub frequency: Option<Vec<i32>>,
}

/// Input for updating a habit; only non-None fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateHabit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Vec<i32>>,
}

impl Habit {
    /// Creates a new habit
    pub async fn create(pool: &PgPool, data: CreateHabit) -> Result<Self, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, name, description, frequency)
            VALUES ($1, $2, $3, COALESCE($4, '{0,1,2,3,4,5,6}'))
            RETURNING id, user_id, name, description, frequency, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.frequency)
        .fetch_one(pool)
        .await?;

        Ok(habit)
    }

    /// Finds a habit by ID scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, frequency, created_at, updated_at
            FROM habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(habit)
    }

    /// Lists a user's habits, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, frequency, created_at, updated_at
            FROM habits
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(habits)
    }

    /// Lists a user's habits oldest first, for the weekly grid
    pub async fn list_by_user_oldest_first(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, frequency, created_at, updated_at
            FROM habits
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(habits)
    }

    /// Updates a habit, scoped to its owner
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateHabit,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE habits SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.frequency.is_some() {
            bind_count += 1;
            query.push_str(&format!(", frequency = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND user_id = $2 RETURNING id, user_id, name, description, \
             frequency, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Habit>(&query).bind(id).bind(user_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(frequency) = data.frequency {
            q = q.bind(frequency);
        }

        let habit = q.fetch_optional(pool).await?;

        Ok(habit)
    }

    /// Deletes a habit and its logs (CASCADE), scoped to its owner
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
