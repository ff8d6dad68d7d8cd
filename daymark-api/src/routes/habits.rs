/// Habit endpoints: CRUD, log toggling, and the weekly grid
///
/// # Endpoints
///
/// - `POST   /v1/habits` - Create habit
/// - `GET    /v1/habits` - List habits with their logs
/// - `GET    /v1/habits/weekly` - 7-day grid per habit
/// - `GET    /v1/habits/:id` - Fetch one habit with logs
/// - `PUT    /v1/habits/:id` - Update habit
/// - `DELETE /v1/habits/:id` - Delete habit and logs
/// - `POST   /v1/habits/:id/toggle` - Toggle the log for a date

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
use chrono::NaiveDate;
use daymark_core::models::habit::{CreateHabit, Habit, UpdateHabit};
use daymark_core::services::habits::{self, HabitWithLogs, ToggleOutcome, WeeklyHabit};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create habit request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub description: Option<String>,

    /// Weekdays the habit recurs on, 0 = Sunday .. 6 = Saturday
    pub frequency: Option<Vec<i32>>,
}

/// Update habit request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub frequency: Option<Vec<i32>>,
}

/// Toggle request naming the date to flip
#[derive(Debug, Deserialize)]
pub struct ToggleLogRequest {
    pub date: NaiveDate,
}

/// Optional explicit week anchor
#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    pub week_start: Option<NaiveDate>,
}

/// Creates a habit
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateHabitRequest>,
) -> ApiResult<(StatusCode, Json<Habit>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let habit = habits::create_habit(
        &state.db,
        CreateHabit {
            user_id: auth.user_id,
            name: req.name,
            description: req.description,
            frequency: req.frequency,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(habit)))
}

/// Lists the caller's habits with their logs
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<HabitWithLogs>>> {
    let result = habits::list_habits(&state.db, auth.user_id).await?;
    Ok(Json(result))
}

/// 7-day grid per habit, anchored to the given or current week
pub async fn weekly(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<WeeklyQuery>,
) -> ApiResult<Json<Vec<WeeklyHabit>>> {
    let result = habits::weekly_habits(&state.db, auth.user_id, query.week_start).await?;
    Ok(Json(result))
}

/// Fetches one habit with its logs
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<HabitWithLogs>> {
    let habit = habits::get_habit(&state.db, id, auth.user_id).await?;
    Ok(Json(habit))
}

/// Updates a habit
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHabitRequest>,
) -> ApiResult<Json<HabitWithLogs>> {
    req.validate().map_err(ApiError::from_validation)?;

    let habit = habits::update_habit(
        &state.db,
        id,
        auth.user_id,
        UpdateHabit {
            name: req.name,
            description: req.description,
            frequency: req.frequency,
        },
    )
    .await?;

    Ok(Json(habit))
}

/// Deletes a habit together with its logs
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    habits::delete_habit(&state.db, id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Habit deleted")))
}

/// Toggles the completion log for one date
pub async fn toggle_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleLogRequest>,
) -> ApiResult<Json<ToggleOutcome>> {
    let outcome = habits::toggle_log(&state.db, id, auth.user_id, req.date).await?;
    Ok(Json(outcome))
}
