/// Integration tests for the Daymark API
///
/// These tests verify the full system works end-to-end:
/// - Authentication flow (register, login, me, provider sign-in)
/// - Task lifecycle, including subtask-driven promotion to REVIEW
/// - Habit log toggle cycle and the weekly grid
/// - Ownership isolation between users
/// - Cascade deletes
/// - Aggregation views (board, gantt, day summary, project counts)
///
/// They require DATABASE_URL and JWT_SECRET in the environment.

mod common;

use axum::http::StatusCode;
use common::{create_task_via_api, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_register_login_me_flow() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("flow-{}@example.com", uuid::Uuid::new_v4());
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            "Bearer none",
            Some(json!({
                "email": email,
                "password": "a-strong-password",
                "full_name": "Flow Tester"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    assert!(body["token"].is_string());
    assert!(body["user"]["password_hash"].is_null());

    // Duplicate email is a conflict
    let (status, _) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            "Bearer none",
            Some(json!({
                "email": email,
                "password": "a-strong-password",
                "full_name": "Flow Tester"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/login",
            "Bearer none",
            Some(json!({ "email": email, "password": "a-strong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request("GET", "/v1/auth/me", &format!("Bearer {}", token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email.as_str());

    // Wrong password is a generic 401
    let (status, _) = ctx
        .request(
            "POST",
            "/v1/auth/login",
            "Bearer none",
            Some(json!({ "email": email, "password": "wrong-password!" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.request("GET", "/v1/tasks", "Bearer garbage", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_completing_last_subtask_promotes_task_to_review() {
    let ctx = TestContext::new().await.unwrap();

    let task_id = create_task_via_api(
        &ctx,
        json!({
            "title": "Ship release",
            "subtasks": [{ "title": "write notes" }, { "title": "tag build" }]
        }),
    )
    .await
    .unwrap();

    let (_, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    let subtasks = task["subtasks"].as_array().unwrap();
    assert_eq!(subtasks.len(), 2);
    assert_eq!(task["status"], "TODO");

    let first = subtasks[0]["id"].as_str().unwrap();
    let second = subtasks[1]["id"].as_str().unwrap();

    // Completing the first of two leaves the task untouched
    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/v1/tasks/{}/subtasks/{}/toggle", task_id, first),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(task["status"], "TODO");

    // Completing the last one forces REVIEW
    ctx.request(
        "PATCH",
        &format!("/v1/tasks/{}/subtasks/{}/toggle", task_id, second),
        &ctx.auth_header(),
        None,
    )
    .await;

    let (_, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(task["status"], "REVIEW");

    // Un-completing a subtask never demotes the task
    ctx.request(
        "PATCH",
        &format!("/v1/tasks/{}/subtasks/{}/toggle", task_id, first),
        &ctx.auth_header(),
        None,
    )
    .await;

    let (_, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(task["status"], "REVIEW");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_status_overwrite_accepts_any_value() {
    let ctx = TestContext::new().await.unwrap();

    let task_id = create_task_via_api(&ctx, json!({ "title": "Odd status" }))
        .await
        .unwrap();

    let (status, task) = ctx
        .request(
            "PATCH",
            &format!("/v1/tasks/{}/status", task_id),
            &ctx.auth_header(),
            Some(json!({ "status": "BLOCKED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "BLOCKED");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_habit_toggle_log_cycles() {
    let ctx = TestContext::new().await.unwrap();

    let (status, habit) = ctx
        .request(
            "POST",
            "/v1/habits",
            &ctx.auth_header(),
            Some(json!({ "name": "Stretch", "frequency": [1, 3, 5] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let habit_id = habit["id"].as_str().unwrap().to_string();

    let uri = format!("/v1/habits/{}/toggle", habit_id);
    let body = json!({ "date": "2024-02-05" });

    let (_, outcome) = ctx
        .request("POST", &uri, &ctx.auth_header(), Some(body.clone()))
        .await;
    assert_eq!(outcome["action"], "created");
    assert_eq!(outcome["is_completed"], true);

    let (_, outcome) = ctx
        .request("POST", &uri, &ctx.auth_header(), Some(body.clone()))
        .await;
    assert_eq!(outcome["action"], "removed");
    assert_eq!(outcome["is_completed"], false);

    let (_, outcome) = ctx
        .request("POST", &uri, &ctx.auth_header(), Some(body))
        .await;
    assert_eq!(outcome["action"], "created");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_weekly_grid_has_seven_consecutive_cells() {
    let ctx = TestContext::new().await.unwrap();

    let (_, habit) = ctx
        .request(
            "POST",
            "/v1/habits",
            &ctx.auth_header(),
            Some(json!({ "name": "Read", "frequency": [1, 3, 5] })),
        )
        .await;
    let habit_id = habit["id"].as_str().unwrap();

    // Log one day inside the requested week
    ctx.request(
        "POST",
        &format!("/v1/habits/{}/toggle", habit_id),
        &ctx.auth_header(),
        Some(json!({ "date": "2024-01-03" })),
    )
    .await;

    let (status, body) = ctx
        .request(
            "GET",
            "/v1/habits/weekly?week_start=2024-01-01",
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let habits = body.as_array().unwrap();
    let entry = habits
        .iter()
        .find(|h| h["id"] == habit["id"])
        .expect("habit missing from weekly view");

    let week = entry["week"].as_array().unwrap();
    assert_eq!(week.len(), 7);
    for (i, cell) in week.iter().enumerate() {
        assert_eq!(cell["day_index"], i as u64);
        assert_eq!(
            cell["date"],
            format!("2024-01-0{}", i + 1),
            "cells must be consecutive from the anchor"
        );
    }

    // 2024-01-03 is logged, everything else implicit false
    assert_eq!(week[2]["is_completed"], true);
    assert!(week[2]["log_id"].is_string());
    assert_eq!(week[0]["is_completed"], false);
    assert!(week[0]["log_id"].is_null());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_ownership_isolation() {
    let ctx = TestContext::new().await.unwrap();

    let task_id = create_task_via_api(
        &ctx,
        json!({ "title": "Private", "subtasks": [{ "title": "secret step" }] }),
    )
    .await
    .unwrap();

    let (_, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    let subtask_id = task["subtasks"][0]["id"].as_str().unwrap();

    // Direct lookups by another user are indistinguishable from absence
    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.other_auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/tasks/{}", task_id),
            &ctx.other_auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Transitive lookups through the parent task report Unauthorized
    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/v1/tasks/{}/subtasks/{}/toggle", task_id, subtask_id),
            &ctx.other_auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The owner still sees everything untouched
    let (status, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["subtasks"][0]["is_completed"], false);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_task_delete_cascades_subtasks_and_comments() {
    let ctx = TestContext::new().await.unwrap();

    let task_id = create_task_via_api(
        &ctx,
        json!({ "title": "Doomed", "subtasks": [{ "title": "a" }, { "title": "b" }] }),
    )
    .await
    .unwrap();

    ctx.request(
        "POST",
        &format!("/v1/tasks/{}/comments", task_id),
        &ctx.auth_header(),
        Some(json!({ "content": "note" })),
    )
    .await;

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (subtasks,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM subtasks WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    let (comments,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM task_comments WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(subtasks, 0);
    assert_eq!(comments, 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_day_summary_excludes_dateless_tasks() {
    let ctx = TestContext::new().await.unwrap();

    create_task_via_api(&ctx, json!({ "title": "No dates" }))
        .await
        .unwrap();
    create_task_via_api(
        &ctx,
        json!({ "title": "Dated", "start_date": "2024-06-10", "status": "DONE" }),
    )
    .await
    .unwrap();
    create_task_via_api(
        &ctx,
        json!({ "title": "Spanning", "start_date": "2024-06-08", "end_date": "2024-06-12" }),
    )
    .await
    .unwrap();

    let (status, summary) = ctx
        .request(
            "GET",
            "/v1/tasks/summary?date=2024-06-10",
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["completed"], 1);
    assert_eq!(summary["pending"], 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_project_counts_and_board_and_gantt() {
    let ctx = TestContext::new().await.unwrap();

    let (status, project) = ctx
        .request(
            "POST",
            "/v1/projects",
            &ctx.auth_header(),
            Some(json!({ "name": "Launch" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["color_hex"], "#6366f1");
    let project_id = project["id"].as_str().unwrap().to_string();

    // 5 tasks, 2 of them DONE; one carries dates, one has an unknown status
    for (title, status_value) in [
        ("t1", "DONE"),
        ("t2", "DONE"),
        ("t3", "TODO"),
        ("t4", "IN_PROGRESS"),
    ] {
        create_task_via_api(
            &ctx,
            json!({ "title": title, "project_id": project_id, "status": status_value }),
        )
        .await
        .unwrap();
    }
    let odd_task = create_task_via_api(
        &ctx,
        json!({
            "title": "t5",
            "project_id": project_id,
            "start_date": "2024-05-01"
        }),
    )
    .await
    .unwrap();
    ctx.request(
        "PATCH",
        &format!("/v1/tasks/{}/status", odd_task),
        &ctx.auth_header(),
        Some(json!({ "status": "BLOCKED" })),
    )
    .await;

    let (_, project) = ctx
        .request(
            "GET",
            &format!("/v1/projects/{}", project_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(project["total_tasks"], 5);
    assert_eq!(project["done_tasks"], 2);
    assert_eq!(project["pending_tasks"], 3);

    // Board covers the four known buckets; the BLOCKED task is dropped
    let (_, board) = ctx
        .request(
            "GET",
            &format!("/v1/projects/{}/board", project_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    let bucketed = board["TODO"].as_array().unwrap().len()
        + board["IN_PROGRESS"].as_array().unwrap().len()
        + board["REVIEW"].as_array().unwrap().len()
        + board["DONE"].as_array().unwrap().len();
    assert_eq!(bucketed, 4);

    // Gantt shows only dated tasks, end defaulting to start
    let (_, gantt) = ctx
        .request(
            "GET",
            &format!("/v1/projects/{}/gantt", project_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    let items = gantt.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["start_date"], "2024-05-01");
    assert_eq!(items[0]["end_date"], "2024-05-01");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_project_delete_unlinks_tasks() {
    let ctx = TestContext::new().await.unwrap();

    let (_, project) = ctx
        .request(
            "POST",
            "/v1/projects",
            &ctx.auth_header(),
            Some(json!({ "name": "Short lived" })),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let task_id = create_task_via_api(
        &ctx,
        json!({ "title": "Survivor", "project_id": project_id }),
    )
    .await
    .unwrap();

    ctx.request(
        "DELETE",
        &format!("/v1/projects/{}", project_id),
        &ctx.auth_header(),
        None,
    )
    .await;

    let (status, task) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(task["project_id"].is_null());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_habit_delete_cascades_logs() {
    let ctx = TestContext::new().await.unwrap();

    let (_, habit) = ctx
        .request(
            "POST",
            "/v1/habits",
            &ctx.auth_header(),
            Some(json!({ "name": "Doomed habit" })),
        )
        .await;
    let habit_id = habit["id"].as_str().unwrap().to_string();

    ctx.request(
        "POST",
        &format!("/v1/habits/{}/toggle", habit_id),
        &ctx.auth_header(),
        Some(json!({ "date": "2024-04-01" })),
    )
    .await;

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/habits/{}", habit_id),
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (logs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM habit_logs WHERE habit_id = $1")
        .bind(habit_id.parse::<uuid::Uuid>().unwrap())
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(logs, 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_oauth_creates_links_and_leaves_linked_accounts_alone() {
    let ctx = TestContext::new().await.unwrap();

    // First sign-in creates the account with the provider profile
    let fresh_email = format!("oauth-{}@example.com", uuid::Uuid::new_v4());
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/oauth",
            "Bearer none",
            Some(json!({
                "email": fresh_email,
                "full_name": "Remote User",
                "avatar_url": "https://cdn.example.com/remote.png",
                "provider": "github",
                "provider_id": "gh-100"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "oauth sign-in failed: {}", body);
    assert_eq!(body["user"]["provider"], "github");
    assert_eq!(body["user"]["avatar_url"], "https://cdn.example.com/remote.png");
    assert!(body["user"]["password_hash"].is_null());

    let token = body["token"].as_str().unwrap().to_string();
    let (status, me) = ctx
        .request("GET", "/v1/auth/me", &format!("Bearer {}", token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], fresh_email.as_str());

    // A local account with the same email gets linked to the provider
    let local_email = format!("oauth-local-{}@example.com", uuid::Uuid::new_v4());
    let (_, registered) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            "Bearer none",
            Some(json!({
                "email": local_email,
                "password": "a-strong-password",
                "full_name": "Local User"
            })),
        )
        .await;
    let local_id = registered["user"]["id"].as_str().unwrap().to_string();
    let local_token = registered["token"].as_str().unwrap().to_string();

    ctx.request(
        "PUT",
        "/v1/auth/profile",
        &format!("Bearer {}", local_token),
        Some(json!({ "avatar_url": "https://example.com/local.png" })),
    )
    .await;

    // Profile without an avatar keeps the existing one
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/oauth",
            "Bearer none",
            Some(json!({
                "email": local_email,
                "full_name": "Local User",
                "avatar_url": null,
                "provider": "github",
                "provider_id": "gh-200"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], local_id.as_str());
    assert_eq!(body["user"]["provider"], "github");
    assert_eq!(body["user"]["avatar_url"], "https://example.com/local.png");

    // Already-linked accounts are left untouched on later sign-ins
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/oauth",
            "Bearer none",
            Some(json!({
                "email": local_email,
                "full_name": "Local User",
                "avatar_url": "https://cdn.example.com/other.png",
                "provider": "github",
                "provider_id": "gh-200"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], local_id.as_str());
    assert_eq!(body["user"]["avatar_url"], "https://example.com/local.png");

    sqlx::query("DELETE FROM users WHERE email = $1 OR email = $2")
        .bind(&fresh_email)
        .bind(&local_email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_upcoming_window_excludes_from_and_done() {
    let ctx = TestContext::new().await.unwrap();

    // Window for from=2024-06-01, days=7 is (2024-06-01, 2024-06-08]
    create_task_via_api(&ctx, json!({ "title": "on from", "start_date": "2024-06-01" }))
        .await
        .unwrap();
    create_task_via_api(&ctx, json!({ "title": "inside", "start_date": "2024-06-04" }))
        .await
        .unwrap();
    create_task_via_api(
        &ctx,
        json!({ "title": "done inside", "start_date": "2024-06-04", "status": "DONE" }),
    )
    .await
    .unwrap();
    create_task_via_api(&ctx, json!({ "title": "boundary", "start_date": "2024-06-08" }))
        .await
        .unwrap();
    create_task_via_api(&ctx, json!({ "title": "beyond", "start_date": "2024-06-09" }))
        .await
        .unwrap();
    create_task_via_api(&ctx, json!({ "title": "dateless" }))
        .await
        .unwrap();

    let (status, body) = ctx
        .request(
            "GET",
            "/v1/tasks/upcoming?from=2024-06-01&days=7",
            &ctx.auth_header(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "upcoming failed: {}", body);

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["inside", "boundary"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_task_validation_rejects_missing_title() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            "/v1/tasks",
            &ctx.auth_header(),
            Some(json!({ "title": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}
