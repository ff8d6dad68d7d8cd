/// Task endpoints: CRUD, subtasks, comments, and day views
///
/// # Endpoints
///
/// - `POST   /v1/tasks` - Create task (with optional inline subtasks)
/// - `GET    /v1/tasks` - List tasks with optional filters
/// - `GET    /v1/tasks/date` - Tasks matching a calendar date
/// - `GET    /v1/tasks/upcoming` - Unfinished tasks starting soon
/// - `GET    /v1/tasks/summary` - Day summary counts
/// - `GET    /v1/tasks/:id` - Fetch one task, hydrated
/// - `PUT    /v1/tasks/:id` - Update task
/// - `DELETE /v1/tasks/:id` - Delete task (cascades)
/// - `PATCH  /v1/tasks/:id/status` - Overwrite status
/// - `POST   /v1/tasks/:id/subtasks` - Add subtask
/// - `PATCH  /v1/tasks/:id/subtasks/:subtask_id/toggle` - Flip subtask
/// - `DELETE /v1/tasks/:id/subtasks/:subtask_id` - Delete subtask
/// - `POST   /v1/tasks/:id/comments` - Add comment
/// - `DELETE /v1/tasks/:id/comments/:comment_id` - Delete comment
///
/// Date-less query parameters default to today.

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
use chrono::{NaiveDate, Utc};
use daymark_core::models::comment::Comment;
use daymark_core::models::subtask::Subtask;
use daymark_core::models::task::{CreateTask, TaskFilters, UpdateTask};
use daymark_core::services::tasks::{self, DaySummary, TaskDetail, TaskOverview};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Inline subtask seed supplied at task creation
#[derive(Debug, Deserialize)]
pub struct SubtaskSeed {
    pub title: String,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Title must be between 1 and 500 characters"
    ))]
    pub title: String,

    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub project_id: Option<Uuid>,

    /// Titles for subtasks created together with the task
    #[serde(default)]
    pub subtasks: Vec<SubtaskSeed>,
}

/// Update task request
///
/// Absent fields are left unchanged; explicit nulls clear nullable columns.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub project_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub end_date: Option<Option<NaiveDate>>,
    pub category: Option<String>,
}

/// Status overwrite request
#[derive(Debug, Deserialize)]
pub struct ToggleStatusRequest {
    pub status: String,
}

/// Subtask creation request
#[derive(Debug, Deserialize, Validate)]
pub struct AddSubtaskRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Title must be between 1 and 500 characters"
    ))]
    pub title: String,
}

/// Comment creation request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// Task list filters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<Uuid>,
    pub priority: Option<String>,
}

/// Date query, defaulting to today when absent
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Upcoming window query
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub from: Option<NaiveDate>,
    pub days: Option<i64>,
}

/// Creates a task, seeding any inline subtasks
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let titles: Vec<String> = req.subtasks.into_iter().map(|s| s.title).collect();

    let task = tasks::create_task(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
            category: req.category,
        },
        &titles,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists the caller's tasks
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<TaskOverview>>> {
    let filters = TaskFilters {
        category: query.category,
        status: query.status,
        project_id: query.project_id,
        priority: query.priority,
    };

    let result = tasks::list_tasks(&state.db, auth.user_id, &filters).await?;
    Ok(Json(result))
}

/// Tasks matching a calendar date
pub async fn by_date(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<TaskOverview>>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let result = tasks::list_tasks_by_date(&state.db, auth.user_id, date).await?;
    Ok(Json(result))
}

/// Unfinished tasks starting within the coming window
pub async fn upcoming(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<TaskOverview>>> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(7);

    let result = tasks::list_upcoming_tasks(&state.db, auth.user_id, from, days).await?;
    Ok(Json(result))
}

/// Day summary counts
pub async fn day_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<DaySummary>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = tasks::day_summary(&state.db, auth.user_id, date).await?;
    Ok(Json(summary))
}

/// Fetches one hydrated task
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    let task = tasks::get_task(&state.db, id, auth.user_id).await?;
    Ok(Json(task))
}

/// Updates a task
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskDetail>> {
    let task = tasks::update_task(
        &state.db,
        id,
        auth.user_id,
        UpdateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
            category: req.category,
        },
    )
    .await?;

    Ok(Json(task))
}

/// Deletes a task along with its subtasks and comments
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    tasks::delete_task(&state.db, id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// Overwrites a task's status with the supplied value
pub async fn toggle_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleStatusRequest>,
) -> ApiResult<Json<TaskDetail>> {
    let task = tasks::set_task_status(&state.db, id, auth.user_id, &req.status).await?;
    Ok(Json(task))
}

/// Adds a subtask to a task
pub async fn add_subtask(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddSubtaskRequest>,
) -> ApiResult<(StatusCode, Json<Subtask>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let subtask = tasks::add_subtask(&state.db, id, auth.user_id, &req.title).await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

/// Flips a subtask's completion flag
///
/// Completing the last open subtask promotes the parent task to REVIEW.
pub async fn toggle_subtask(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((_task_id, subtask_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Subtask>> {
    let subtask = tasks::toggle_subtask(&state.db, subtask_id, auth.user_id).await?;
    Ok(Json(subtask))
}

/// Deletes a subtask
pub async fn delete_subtask(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((_task_id, subtask_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    tasks::delete_subtask(&state.db, subtask_id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Subtask deleted")))
}

/// Adds a comment to a task
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let comment = tasks::add_comment(&state.db, id, auth.user_id, &req.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Deletes a comment the caller authored
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((_task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    tasks::delete_comment(&state.db, comment_id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Comment deleted")))
}
