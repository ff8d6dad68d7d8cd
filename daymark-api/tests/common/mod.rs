/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user creation (two users, for ownership isolation tests)
/// - JWT token generation
/// - Request helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use daymark_api::app::{build_router, AppState};
use daymark_api::config::Config;
use daymark_core::auth::jwt::{create_token, Claims};
use daymark_core::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,

    /// Primary test user; most requests run as this user
    pub user: User,
    pub jwt_token: String,

    /// Second user, for cross-user access tests
    pub other_user: User,
    pub other_token: String,
}

impl TestContext {
    /// Creates a new test context with fresh users on a migrated database
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db).await?;
        let other_user = create_test_user(&db).await?;

        let jwt_token = create_token(&Claims::new(user.id), &config.jwt.secret)?;
        let other_token = create_token(&Claims::new(other_user.id), &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
            other_user,
            other_token,
        })
    }

    /// Returns authorization header value for the primary user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Returns authorization header value for the second user
    pub fn other_auth_header(&self) -> String {
        format!("Bearer {}", self.other_token)
    }

    /// Sends a JSON request as the given user, returning status and parsed body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        auth: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", auth);

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Cleans up test data
    ///
    /// Deleting the users cascades to every entity they own.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1 OR id = $2")
            .bind(self.user.id)
            .bind(self.other_user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Creates a test user with a unique email
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: Some("unused-hash".to_string()),
            full_name: "Test User".to_string(),
            avatar_url: None,
            provider: "local".to_string(),
            provider_id: None,
        },
    )
    .await?;

    Ok(user)
}

/// Helper to create a task via the API and return its id
pub async fn create_task_via_api(
    ctx: &TestContext,
    body: serde_json::Value,
) -> anyhow::Result<Uuid> {
    let (status, json) = ctx
        .request("POST", "/v1/tasks", &ctx.auth_header(), Some(body))
        .await;

    anyhow::ensure!(
        status == StatusCode::CREATED,
        "Task creation failed: {} {}",
        status,
        json
    );

    Ok(json["id"].as_str().unwrap().parse()?)
}
