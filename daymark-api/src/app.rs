/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use daymark_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = daymark_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use daymark_core::auth::jwt;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Authenticated caller, injected into request extensions by the JWT layer
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated user's id
    pub user_id: Uuid,
}

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /v1/                             # API v1 (versioned)
/// │   ├── /auth/
/// │   │   ├── POST /register           # Create local account (public)
/// │   │   ├── POST /login              # Local login (public)
/// │   │   ├── POST /oauth              # Provider sign-in / linking (public)
/// │   │   ├── GET  /me                 # Current profile
/// │   │   └── PUT  /profile            # Update profile
/// │   ├── /projects/                   # CRUD + /:id/tasks /board /gantt
/// │   ├── /tasks/                      # CRUD + /date /upcoming /summary
/// │   │                                # + subtask and comment sub-routes
/// │   └── /habits/                     # CRUD + /weekly + /:id/toggle
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/oauth", post(routes::auth::oauth_sign_in));

    // Authenticated profile routes
    let auth_private = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/profile", put(routes::auth::update_profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create).get(routes::projects::list),
        )
        .route(
            "/:id",
            get(routes::projects::get_by_id)
                .put(routes::projects::update)
                .delete(routes::projects::delete),
        )
        .route("/:id/tasks", get(routes::projects::tasks))
        .route("/:id/board", get(routes::projects::board))
        .route("/:id/gantt", get(routes::projects::gantt))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create).get(routes::tasks::list))
        .route("/date", get(routes::tasks::by_date))
        .route("/upcoming", get(routes::tasks::upcoming))
        .route("/summary", get(routes::tasks::day_summary))
        .route(
            "/:id",
            get(routes::tasks::get_by_id)
                .put(routes::tasks::update)
                .delete(routes::tasks::delete),
        )
        .route("/:id/status", patch(routes::tasks::toggle_status))
        .route("/:id/subtasks", post(routes::tasks::add_subtask))
        .route(
            "/:id/subtasks/:subtask_id/toggle",
            patch(routes::tasks::toggle_subtask),
        )
        .route(
            "/:id/subtasks/:subtask_id",
            delete(routes::tasks::delete_subtask),
        )
        .route("/:id/comments", post(routes::tasks::add_comment))
        .route(
            "/:id/comments/:comment_id",
            delete(routes::tasks::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let habit_routes = Router::new()
        .route("/", post(routes::habits::create).get(routes::habits::list))
        .route("/weekly", get(routes::habits::weekly))
        .route(
            "/:id",
            get(routes::habits::get_by_id)
                .put(routes::habits::update)
                .delete(routes::habits::delete),
        )
        .route("/:id/toggle", post(routes::habits::toggle_log))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_private))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/habits", habit_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // Insert into request extensions
    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
