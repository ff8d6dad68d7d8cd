/// Habit service: CRUD, the log toggle cycle, and the weekly grid
///
/// A day's completion state is encoded by row presence: no log row means not
/// completed. [`toggle_log`] walks the three possible states, and the weekly
/// grid materializes exactly 7 cells per habit from whatever rows exist.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::habit::{CreateHabit, Habit, UpdateHabit};
use crate::models::habit_log::HabitLog;

use super::ServiceError;

/// Habit with its full log history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitWithLogs {
    #[serde(flatten)]
    pub habit: Habit,
    pub logs: Vec<HabitLog>,
}

/// What a toggle did to the (habit, date) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    /// No log existed; one was created completed
    Created,
    /// An incomplete log existed; it was marked completed
    Completed,
    /// A completed log existed; it was deleted
    Removed,
}

/// Result of toggling a habit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub date: NaiveDate,
    pub is_completed: bool,
    pub action: LogAction,
}

/// One cell of the weekly grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,

    /// Offset from the week anchor, 0..=6
    pub day_index: usize,

    pub is_completed: bool,
    pub log_id: Option<Uuid>,
}

/// Habit with its 7-cell week grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHabit {
    #[serde(flatten)]
    pub habit: Habit,
    pub week: Vec<DayCell>,
}

/// Creates a habit
pub async fn create_habit(pool: &PgPool, data: CreateHabit) -> Result<Habit, ServiceError> {
    if data.name.trim().is_empty() {
        return Err(ServiceError::Validation("Name is required".to_string()));
    }

    let habit = Habit::create(pool, data).await?;
    Ok(habit)
}

/// Lists the caller's habits with their logs, newest habit first
pub async fn list_habits(pool: &PgPool, user_id: Uuid) -> Result<Vec<HabitWithLogs>, ServiceError> {
    let habits = Habit::list_by_user(pool, user_id).await?;
    attach_logs(pool, habits).await
}

/// Fetches one habit with its logs, scoped to its owner
pub async fn get_habit(
    pool: &PgPool,
    habit_id: Uuid,
    user_id: Uuid,
) -> Result<HabitWithLogs, ServiceError> {
    let habit = Habit::find_by_id_and_user(pool, habit_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("Habit"))?;

    let logs = HabitLog::list_for_habits(pool, &[habit.id]).await?;
    Ok(HabitWithLogs { habit, logs })
}

/// Updates a habit
pub async fn update_habit(
    pool: &PgPool,
    habit_id: Uuid,
    user_id: Uuid,
    data: UpdateHabit,
) -> Result<HabitWithLogs, ServiceError> {
    Habit::update(pool, habit_id, user_id, data)
        .await?
        .ok_or(ServiceError::NotFound("Habit"))?;

    get_habit(pool, habit_id, user_id).await
}

/// Deletes a habit and all of its logs
pub async fn delete_habit(
    pool: &PgPool,
    habit_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let deleted = Habit::delete(pool, habit_id, user_id).await?;
    if !deleted {
        return Err(ServiceError::NotFound("Habit"));
    }
    Ok(())
}

/// Toggles the log for (habit, date)
///
/// Three-way outcome: no log creates one completed; a completed log is
/// deleted, reverting the day to the implicit not-completed state; an
/// incomplete log is flipped to completed. Cycling the same date therefore
/// alternates created and removed.
pub async fn toggle_log(
    pool: &PgPool,
    habit_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<ToggleOutcome, ServiceError> {
    Habit::find_by_id_and_user(pool, habit_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("Habit"))?;

    match HabitLog::find_by_habit_and_date(pool, habit_id, date).await? {
        Some(log) if log.is_completed => {
            HabitLog::delete(pool, log.id).await?;
            Ok(ToggleOutcome {
                date,
                is_completed: false,
                action: LogAction::Removed,
            })
        }
        Some(log) => {
            HabitLog::mark_completed(pool, log.id).await?;
            Ok(ToggleOutcome {
                date,
                is_completed: true,
                action: LogAction::Completed,
            })
        }
        None => {
            HabitLog::create(pool, habit_id, date).await?;
            Ok(ToggleOutcome {
                date,
                is_completed: true,
                action: LogAction::Created,
            })
        }
    }
}

/// Builds the 7-day grid for every habit the caller owns
///
/// The anchor is the supplied date, or the Monday of the current week when
/// absent. Every habit is included regardless of its frequency set; the
/// frequency is descriptive metadata and does not filter the grid.
pub async fn weekly_habits(
    pool: &PgPool,
    user_id: Uuid,
    week_start: Option<NaiveDate>,
) -> Result<Vec<WeeklyHabit>, ServiceError> {
    let anchor = week_start.unwrap_or_else(|| resolve_week_start(Utc::now().date_naive()));
    let week_end = anchor + Duration::days(6);

    let habits = Habit::list_by_user_oldest_first(pool, user_id).await?;
    if habits.is_empty() {
        return Ok(Vec::new());
    }

    let habit_ids: Vec<Uuid> = habits.iter().map(|h| h.id).collect();
    let mut logs_by_habit: HashMap<Uuid, Vec<HabitLog>> = HashMap::new();
    for log in HabitLog::list_for_habits_between(pool, &habit_ids, anchor, week_end).await? {
        logs_by_habit.entry(log.habit_id).or_default().push(log);
    }

    let weekly = habits
        .into_iter()
        .map(|habit| {
            let logs = logs_by_habit.remove(&habit.id).unwrap_or_default();
            let week = build_week(anchor, &logs);
            WeeklyHabit { habit, week }
        })
        .collect();

    Ok(weekly)
}

/// Resolves the default week anchor from today's date
///
/// Monday of the current week, with Sunday mapping to the following Monday
/// (day index 0 plus one).
pub fn resolve_week_start(today: NaiveDate) -> NaiveDate {
    let days_from_sunday = today.weekday().num_days_from_sunday() as i64;
    today + Duration::days(1 - days_from_sunday)
}

/// Builds the 7 consecutive day cells starting at the anchor
fn build_week(anchor: NaiveDate, logs: &[HabitLog]) -> Vec<DayCell> {
    (0..7)
        .map(|i| {
            let date = anchor + Duration::days(i as i64);
            let log = logs.iter().find(|l| l.date == date);

            DayCell {
                date,
                day_index: i,
                is_completed: log.map(|l| l.is_completed).unwrap_or(false),
                log_id: log.map(|l| l.id),
            }
        })
        .collect()
}

/// Batch-loads logs for a habit list, preserving habit order
async fn attach_logs(
    pool: &PgPool,
    habits: Vec<Habit>,
) -> Result<Vec<HabitWithLogs>, ServiceError> {
    if habits.is_empty() {
        return Ok(Vec::new());
    }

    let habit_ids: Vec<Uuid> = habits.iter().map(|h| h.id).collect();
    let mut logs_by_habit: HashMap<Uuid, Vec<HabitLog>> = HashMap::new();
    for log in HabitLog::list_for_habits(pool, &habit_ids).await? {
        logs_by_habit.entry(log.habit_id).or_default().push(log);
    }

    let with_logs = habits
        .into_iter()
        .map(|habit| {
            let logs = logs_by_habit.remove(&habit.id).unwrap_or_default();
            HabitWithLogs { habit, logs }
        })
        .collect();

    Ok(with_logs)
}
