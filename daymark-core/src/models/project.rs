/// Project model and database operations
///
/// A project belongs to exactly one user and groups tasks. Deleting a
/// project does not delete its tasks; their `project_id` is set NULL by the
/// foreign key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     color_hex VARCHAR(7) NOT NULL DEFAULT '#6366f1',
///     status TEXT NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Default display color for new projects
pub const DEFAULT_COLOR: &str = "#6366f1";

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Display color, "#rrggbb"
    pub color_hex: String,

    /// Lifecycle status: "active" or "archived"
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact projection of a project, embedded in task responses
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub color_hex: String,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// Defaults to [`DEFAULT_COLOR`] when None
    pub color_hex: Option<String>,
}

/// Input for updating a project; only non-None fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub status: Option<String>,
}

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (user_id, name, description, color_hex)
            VALUES ($1, $2, $3, COALESCE($4, '#6366f1'))
            RETURNING id, user_id, name, description, color_hex, status, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.color_hex)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID scoped to its owner
    ///
    /// Returns None both when the project doesn't exist and when it belongs
    /// to another user; callers can't distinguish the two.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, name, description, color_hex, status, created_at, updated_at
            FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists a user's projects, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, name, description, color_hex, status, created_at, updated_at
            FROM projects
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project, scoped to its owner
    ///
    /// Returns None when the project doesn't exist or isn't owned by
    /// `user_id`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.color_hex.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color_hex = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND user_id = $2 RETURNING id, user_id, name, description, \
             color_hex, status, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id).bind(user_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(color_hex) = data.color_hex {
            q = q.bind(color_hex);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project, scoped to its owner
    ///
    /// Tasks referencing the project survive with `project_id` cleared.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ProjectSummary {
    /// Fetches compact summaries for a set of project ids
    ///
    /// Used to hydrate task responses without joining on every task query.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let summaries = sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT id, name, color_hex
            FROM projects
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }
}
