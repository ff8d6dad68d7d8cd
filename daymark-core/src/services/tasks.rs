/// Task service: lifecycle, subtasks, comments, and the day summary
///
/// Task responses are hydrated: subtasks, comments, and a compact project
/// summary ride along with the task row. List endpoints hydrate in batch
/// (one query per relation using `= ANY`) instead of per task.
///
/// The one engine-driven status transition lives here: flipping a subtask
/// from incomplete to complete, when that leaves every subtask of the task
/// complete, forces the task into REVIEW. The flip and the promotion run in
/// one transaction.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::project::ProjectSummary;
use crate::models::subtask::Subtask;
use crate::models::task::{CreateTask, Task, TaskFilters, UpdateTask};

use super::ServiceError;

/// Fully hydrated task: subtasks, comments, and project summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
    pub comments: Vec<Comment>,
    pub project: Option<ProjectSummary>,
}

/// Task with subtasks and project summary, used by list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOverview {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
    pub project: Option<ProjectSummary>,
}

/// Counts for tasks matching one calendar date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Creates a task, seeding inline subtasks in the same transaction
pub async fn create_task(
    pool: &PgPool,
    data: CreateTask,
    subtask_titles: &[String],
) -> Result<TaskDetail, ServiceError> {
    if data.title.trim().is_empty() {
        return Err(ServiceError::Validation("Title is required".to_string()));
    }

    let user_id = data.user_id;

    let mut tx = pool.begin().await?;
    let task = Task::create(&mut *tx, data).await?;
    for title in subtask_titles {
        Subtask::create(&mut *tx, task.id, title).await?;
    }
    tx.commit().await?;

    get_task(pool, task.id, user_id).await
}

/// Fetches a hydrated task, scoped to its owner
pub async fn get_task(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<TaskDetail, ServiceError> {
    let task = Task::find_by_id_and_user(pool, task_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    hydrate_detail(pool, task).await
}

/// Lists the caller's tasks with optional filters
pub async fn list_tasks(
    pool: &PgPool,
    user_id: Uuid,
    filters: &TaskFilters,
) -> Result<Vec<TaskOverview>, ServiceError> {
    let tasks = Task::list_by_user(pool, user_id, filters).await?;
    hydrate_overviews(pool, tasks).await
}

/// Lists tasks matching a calendar date
pub async fn list_tasks_by_date(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<TaskOverview>, ServiceError> {
    let tasks = Task::list_by_date(pool, user_id, date).await?;
    hydrate_overviews(pool, tasks).await
}

/// Lists unfinished tasks starting in the `days` days after `from`
pub async fn list_upcoming_tasks(
    pool: &PgPool,
    user_id: Uuid,
    from: NaiveDate,
    days: i64,
) -> Result<Vec<TaskOverview>, ServiceError> {
    let to = from + Duration::days(days);
    let tasks = Task::list_upcoming(pool, user_id, from, to).await?;
    hydrate_overviews(pool, tasks).await
}

/// Updates a task and returns it hydrated
pub async fn update_task(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    data: UpdateTask,
) -> Result<TaskDetail, ServiceError> {
    let task = Task::update(pool, task_id, user_id, data)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    hydrate_detail(pool, task).await
}

/// Overwrites a task's status
///
/// The value is stored verbatim; no transition table restricts it.
pub async fn set_task_status(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    status: &str,
) -> Result<TaskDetail, ServiceError> {
    Task::find_by_id_and_user(pool, task_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    Task::set_status(pool, task_id, status).await?;
    get_task(pool, task_id, user_id).await
}

/// Deletes a task along with its subtasks and comments
pub async fn delete_task(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let deleted = Task::delete(pool, task_id, user_id).await?;
    if !deleted {
        return Err(ServiceError::NotFound("Task"));
    }
    Ok(())
}

/// Adds a subtask to a task the caller owns
pub async fn add_subtask(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    title: &str,
) -> Result<Subtask, ServiceError> {
    Task::find_by_id_and_user(pool, task_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let subtask = Subtask::create(pool, task_id, title).await?;
    Ok(subtask)
}

/// Flips a subtask's completion flag
///
/// Ownership is resolved through the parent task; a mismatch is
/// Unauthorized rather than NotFound. When the flip turns the subtask on
/// and no incomplete subtasks remain, the parent task is promoted to
/// REVIEW in the same transaction.
pub async fn toggle_subtask(
    pool: &PgPool,
    subtask_id: Uuid,
    user_id: Uuid,
) -> Result<Subtask, ServiceError> {
    let subtask = Subtask::find_by_id(pool, subtask_id)
        .await?
        .ok_or(ServiceError::NotFound("Subtask"))?;

    let task = Task::find_by_id(pool, subtask.task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;
    if task.user_id != user_id {
        return Err(ServiceError::Unauthorized);
    }

    let mut tx = pool.begin().await?;

    let updated = Subtask::set_completed(&mut *tx, subtask_id, !subtask.is_completed)
        .await?
        .ok_or(ServiceError::NotFound("Subtask"))?;

    if updated.is_completed {
        let (incomplete,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM subtasks WHERE task_id = $1 AND is_completed = FALSE",
        )
        .bind(task.id)
        .fetch_one(&mut *tx)
        .await?;

        if incomplete == 0 {
            Task::set_status(&mut *tx, task.id, "REVIEW").await?;
        }
    }

    tx.commit().await?;

    Ok(updated)
}

/// Deletes a subtask, resolving ownership through the parent task
pub async fn delete_subtask(
    pool: &PgPool,
    subtask_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let subtask = Subtask::find_by_id(pool, subtask_id)
        .await?
        .ok_or(ServiceError::NotFound("Subtask"))?;

    let task = Task::find_by_id(pool, subtask.task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;
    if task.user_id != user_id {
        return Err(ServiceError::Unauthorized);
    }

    Subtask::delete(pool, subtask_id).await?;
    Ok(())
}

/// Adds a comment to a task the caller owns
pub async fn add_comment(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Comment, ServiceError> {
    Task::find_by_id_and_user(pool, task_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let comment = Comment::create(pool, task_id, user_id, content).await?;
    Ok(comment)
}

/// Deletes a comment the caller authored
pub async fn delete_comment(
    pool: &PgPool,
    comment_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let deleted = Comment::delete(pool, comment_id, user_id).await?;
    if !deleted {
        return Err(ServiceError::NotFound("Comment"));
    }
    Ok(())
}

/// Counts for tasks matching a calendar date
///
/// A task with no start date never matches, so it never shows up in the
/// totals.
pub async fn day_summary(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<DaySummary, ServiceError> {
    let tasks = Task::list_by_date(pool, user_id, date).await?;
    Ok(summarize(date, &tasks))
}

/// Builds the day summary counts from the matched tasks
fn summarize(date: NaiveDate, tasks: &[Task]) -> DaySummary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.status == "DONE").count();

    DaySummary {
        date,
        total,
        completed,
        pending: total - completed,
    }
}

/// Hydrates a single task with subtasks, comments, and project summary
async fn hydrate_detail(pool: &PgPool, task: Task) -> Result<TaskDetail, ServiceError> {
    let subtasks = Subtask::list_by_task(pool, task.id).await?;
    let comments = Comment::list_by_task(pool, task.id).await?;

    let project = match task.project_id {
        Some(project_id) => ProjectSummary::find_by_ids(pool, &[project_id])
            .await?
            .into_iter()
            .next(),
        None => None,
    };

    Ok(TaskDetail {
        task,
        subtasks,
        comments,
        project,
    })
}

/// Hydrates a list of tasks in batch, preserving order
pub(crate) async fn hydrate_overviews(
    pool: &PgPool,
    tasks: Vec<Task>,
) -> Result<Vec<TaskOverview>, ServiceError> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let project_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.project_id).collect();
        ids.sort();
        ids.dedup();
        ids
    };

    let mut subtasks_by_task: HashMap<Uuid, Vec<Subtask>> = HashMap::new();
    for subtask in Subtask::list_by_tasks(pool, &task_ids).await? {
        subtasks_by_task
            .entry(subtask.task_id)
            .or_default()
            .push(subtask);
    }

    let projects_by_id: HashMap<Uuid, ProjectSummary> = if project_ids.is_empty() {
        HashMap::new()
    } else {
        ProjectSummary::find_by_ids(pool, &project_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let overviews = tasks
        .into_iter()
        .map(|task| {
            let subtasks = subtasks_by_task.remove(&task.id).unwrap_or_default();
            let project = task.project_id.and_then(|id| projects_by_id.get(&id).cloned());
            TaskOverview {
                task,
                subtasks,
                project,
            }
        })
        .collect();

    Ok(overviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_with_status(status: &str, start_date: Option<NaiveDate>) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_id: None,
            title: "t".to_string(),
            description: None,
            priority: "MEDIUM".to_string(),
            status: status.to_string(),
            start_date,
            end_date: None,
            category: "PERSONAL".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_counts_done_as_completed() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let tasks = vec![
            task_with_status("DONE", Some(date)),
            task_with_status("TODO", Some(date)),
            task_with_status("IN_PROGRESS", Some(date)),
        ];

        let summary = summarize(date, &tasks);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.date, date);
    }

    #[test]
    fn test_summarize_empty() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let summary = summarize(date, &[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.pending, 0);
    }
}
