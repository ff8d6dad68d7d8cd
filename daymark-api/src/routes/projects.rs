/// Project endpoints: CRUD plus the board and gantt views
///
/// # Endpoints
///
/// - `POST   /v1/projects` - Create project
/// - `GET    /v1/projects` - List projects with task counts
/// - `GET    /v1/projects/:id` - Fetch one project with counts
/// - `PUT    /v1/projects/:id` - Update project
/// - `DELETE /v1/projects/:id` - Delete project (tasks keep living, unlinked)
/// - `GET    /v1/projects/:id/tasks` - Project tasks, optional status filter
/// - `GET    /v1/projects/:id/board` - Kanban board grouped by status
/// - `GET    /v1/projects/:id/gantt` - Date-ranged tasks for the gantt chart

use crate::{
    app::{AppState, AuthContext},
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use daymark_core::models::project::{CreateProject, Project, UpdateProject};
use daymark_core::services::projects::{self, BoardView, GanttItem, ProjectWithCounts};
use daymark_core::services::tasks::TaskOverview;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(min = 4, max = 7, message = "Color must be a hex color"))]
    pub color_hex: Option<String>,
}

/// Update project request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 4, max = 7, message = "Color must be a hex color"))]
    pub color_hex: Option<String>,

    pub status: Option<String>,
}

/// Status filter for the project task list
#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub status: Option<String>,
}

/// Creates a project
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = projects::create_project(
        &state.db,
        CreateProject {
            user_id: auth.user_id,
            name: req.name,
            description: req.description,
            color_hex: req.color_hex,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Lists the caller's projects with task counts
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectWithCounts>>> {
    let result = projects::list_projects(&state.db, auth.user_id).await?;
    Ok(Json(result))
}

/// Fetches one project with task counts
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectWithCounts>> {
    let project = projects::get_project(&state.db, id, auth.user_id).await?;
    Ok(Json(project))
}

/// Updates a project
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectWithCounts>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = projects::update_project(
        &state.db,
        id,
        auth.user_id,
        UpdateProject {
            name: req.name,
            description: req.description,
            color_hex: req.color_hex,
            status: req.status,
        },
    )
    .await?;

    Ok(Json(project))
}

/// Deletes a project
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    projects::delete_project(&state.db, id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Project deleted")))
}

/// Lists a project's tasks
pub async fn tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<TasksQuery>,
) -> ApiResult<Json<Vec<TaskOverview>>> {
    let result =
        projects::project_tasks(&state.db, id, auth.user_id, query.status.as_deref()).await?;
    Ok(Json(result))
}

/// Kanban board grouped by status
pub async fn board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BoardView>> {
    let board = projects::project_board(&state.db, id, auth.user_id).await?;
    Ok(Json(board))
}

/// Gantt bars for the project's dated tasks
pub async fn gantt(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<GanttItem>>> {
    let items = projects::project_gantt(&state.db, id, auth.user_id).await?;
    Ok(Json(items))
}
