/// Integration tests for the TaskHub API
///
/// These tests verify the full system works end-to-end through the router:
/// - Authentication guard on protected routes
/// - Project lifecycle with manager-only mutations
/// - Task workflow with status history
/// - Team roster management
/// - Notes with author-only deletion
///
/// A running PostgreSQL database is required; every test skips itself when
/// DATABASE_URL is not set.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use taskhub_shared::models::membership::Membership;
use uuid::Uuid;

#[tokio::test]
async fn test_health_endpoint() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let response = ctx.send(common::request("GET", "/health", None)).await;
    let body = common::read_json(response, StatusCode::OK).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

/// Counts the auth tokens currently held by the user with the given email
async fn count_tokens(ctx: &TestContext, email: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM auth_tokens t JOIN users u ON u.id = t.user_id WHERE u.email = $1",
    )
    .bind(email)
    .fetch_one(&ctx.db)
    .await
    .expect("Count query failed");
    count
}

#[tokio::test]
async fn test_account_lifecycle() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let email = format!("signup-{}@example.com", Uuid::new_v4());

    // Register
    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/auth/create-account",
            None,
            json!({"name": "New User", "email": email, "password": "password1"}),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Account created, check your email to confirm it");

    // Duplicate email conflicts
    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/auth/create-account",
            None,
            json!({"name": "Imposter", "email": email, "password": "password1"}),
        ))
        .await;
    common::read_json(response, StatusCode::CONFLICT).await;

    // Login before confirming is rejected and issues a fresh confirmation
    // code as a side effect
    let tokens_before = count_tokens(&ctx, &email).await;

    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": email, "password": "password1"}),
        ))
        .await;
    common::read_json(response, StatusCode::UNAUTHORIZED).await;

    let tokens_after = count_tokens(&ctx, &email).await;
    assert_eq!(
        tokens_after,
        tokens_before + 1,
        "Rejected unconfirmed login should issue a new confirmation code"
    );

    // Fetch the confirmation code the mailer would have delivered
    let (code,): (String,) = sqlx::query_as(
        "SELECT t.token FROM auth_tokens t JOIN users u ON u.id = t.user_id \
         WHERE u.email = $1 ORDER BY t.created_at LIMIT 1",
    )
    .bind(&email)
    .fetch_one(&ctx.db)
    .await
    .expect("Confirmation token should exist");

    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/auth/confirm-account",
            None,
            json!({"token": code}),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Account confirmed");

    // Login now succeeds and returns a usable session token
    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": email, "password": "password1"}),
        ))
        .await;
    let jwt = common::read_body(response, StatusCode::OK).await;

    let response = ctx
        .send(common::request(
            "GET",
            "/api/auth/user",
            Some(&format!("Bearer {}", jwt)),
        ))
        .await;
    let profile = common::read_json(response, StatusCode::OK).await;
    assert_eq!(profile["email"], email);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let response = ctx.send(common::request("GET", "/api/projects", None)).await;
    common::read_body(response, StatusCode::UNAUTHORIZED).await;

    let response = ctx
        .send(common::request(
            "GET",
            "/api/projects",
            Some("Bearer not-a-jwt"),
        ))
        .await;
    common::read_body(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn test_project_crud() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let auth = ctx.auth_header();

    // Create
    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/projects",
            Some(&auth),
            json!({
                "project_name": "Launch",
                "client_name": "Acme",
                "description": "Launch plan"
            }),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Project created");

    // List
    let response = ctx
        .send(common::request("GET", "/api/projects", Some(&auth)))
        .await;
    let projects = common::read_json(response, StatusCode::OK).await;
    let project = projects
        .as_array()
        .expect("List should be an array")
        .iter()
        .find(|p| p["project_name"] == "Launch")
        .expect("Created project should be listed")
        .clone();
    let project_id = project["id"].as_str().expect("Project has an ID");

    // Detail includes an empty task list
    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}", project_id),
            Some(&auth),
        ))
        .await;
    let detail = common::read_json(response, StatusCode::OK).await;
    assert_eq!(detail["project_name"], "Launch");
    assert_eq!(detail["tasks"], json!([]));

    // Update
    let response = ctx
        .send(common::json_request(
            "PUT",
            &format!("/api/projects/{}", project_id),
            Some(&auth),
            json!({
                "project_name": "Launch v2",
                "client_name": "Acme",
                "description": "Revised plan"
            }),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Project updated");

    // Delete
    let response = ctx
        .send(common::request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&auth),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Project deleted");

    // Gone
    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}", project_id),
            Some(&auth),
        ))
        .await;
    common::read_body(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_unknown_project_is_404() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}", Uuid::new_v4()),
            Some(&ctx.auth_header()),
        ))
        .await;
    common::read_body(response, StatusCode::NOT_FOUND).await;
}

/// Creates a project through the API and returns its ID
async fn create_project(ctx: &TestContext, auth: &str) -> String {
    let name = format!("Project {}", Uuid::new_v4());

    let response = ctx
        .send(common::json_request(
            "POST",
            "/api/projects",
            Some(auth),
            json!({
                "project_name": name,
                "client_name": "Acme",
                "description": "Test project"
            }),
        ))
        .await;
    common::read_body(response, StatusCode::OK).await;

    let response = ctx
        .send(common::request("GET", "/api/projects", Some(auth)))
        .await;
    let projects = common::read_json(response, StatusCode::OK).await;
    projects
        .as_array()
        .expect("List should be an array")
        .iter()
        .find(|p| p["project_name"] == name.as_str())
        .expect("Project should be listed")["id"]
        .as_str()
        .expect("Project has an ID")
        .to_string()
}

#[tokio::test]
async fn test_manager_only_mutations() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let manager_auth = ctx.auth_header();
    let project_id = create_project(&ctx, &manager_auth).await;

    // A collaborator on the team can read but not mutate
    let collaborator = common::create_confirmed_user(&ctx.db).await;
    let collaborator_auth = ctx.auth_header_for(collaborator.id);
    Membership::add(
        &ctx.db,
        project_id.parse().expect("Valid UUID"),
        collaborator.id,
    )
    .await
    .expect("Failed to add member");

    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}", project_id),
            Some(&collaborator_auth),
        ))
        .await;
    common::read_json(response, StatusCode::OK).await;

    let response = ctx
        .send(common::json_request(
            "PUT",
            &format!("/api/projects/{}", project_id),
            Some(&collaborator_auth),
            json!({
                "project_name": "Hijacked",
                "client_name": "Acme",
                "description": "Nope"
            }),
        ))
        .await;
    let body = common::read_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "invalid_action");

    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/tasks", project_id),
            Some(&collaborator_auth),
            json!({"name": "Sneaky", "description": "Nope"}),
        ))
        .await;
    common::read_json(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_task_workflow() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let auth = ctx.auth_header();
    let project_id = create_project(&ctx, &auth).await;

    // Create a task
    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/tasks", project_id),
            Some(&auth),
            json!({"name": "Ship it", "description": "Release the feature"}),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Task created");

    // List tasks
    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}/tasks", project_id),
            Some(&auth),
        ))
        .await;
    let tasks = common::read_json(response, StatusCode::OK).await;
    let task_id = tasks[0]["id"].as_str().expect("Task has an ID").to_string();
    assert_eq!(tasks[0]["status"], "pending");

    // Move it through the workflow
    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/tasks/{}/status", project_id, task_id),
            Some(&auth),
            json!({"status": "inProgress"}),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Status updated");

    // Detail carries the history
    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}/tasks/{}", project_id, task_id),
            Some(&auth),
        ))
        .await;
    let detail = common::read_json(response, StatusCode::OK).await;
    assert_eq!(detail["status"], "inProgress");
    assert_eq!(detail["status_history"][0]["status"], "inProgress");
    assert_eq!(
        detail["status_history"][0]["changed_by"]["id"],
        ctx.user.id.to_string()
    );

    // Addressing the task through a different project is rejected
    let other_project_id = create_project(&ctx, &auth).await;
    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}/tasks/{}", other_project_id, task_id),
            Some(&auth),
        ))
        .await;
    let body = common::read_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "invalid_action");
}

#[tokio::test]
async fn test_team_management() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let auth = ctx.auth_header();
    let project_id = create_project(&ctx, &auth).await;
    let member = common::create_confirmed_user(&ctx.db).await;

    // Find by email
    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/team/find", project_id),
            Some(&auth),
            json!({"email": member.email}),
        ))
        .await;
    let found = common::read_json(response, StatusCode::OK).await;
    assert_eq!(found["id"], member.id.to_string());

    // Add
    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/team", project_id),
            Some(&auth),
            json!({"id": member.id}),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Member added");

    // Adding twice conflicts
    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/team", project_id),
            Some(&auth),
            json!({"id": member.id}),
        ))
        .await;
    common::read_json(response, StatusCode::CONFLICT).await;

    // Roster lists the member
    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}/team", project_id),
            Some(&auth),
        ))
        .await;
    let team = common::read_json(response, StatusCode::OK).await;
    assert_eq!(team.as_array().expect("Array").len(), 1);

    // Remove
    let response = ctx
        .send(common::request(
            "DELETE",
            &format!("/api/projects/{}/team/{}", project_id, member.id),
            Some(&auth),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Member removed");

    // Removing again conflicts
    let response = ctx
        .send(common::request(
            "DELETE",
            &format!("/api/projects/{}/team/{}", project_id, member.id),
            Some(&auth),
        ))
        .await;
    common::read_json(response, StatusCode::CONFLICT).await;
}

#[tokio::test]
async fn test_note_author_only_delete() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let auth = ctx.auth_header();
    let project_id = create_project(&ctx, &auth).await;

    let response = ctx
        .send(common::json_request(
            "POST",
            &format!("/api/projects/{}/tasks", project_id),
            Some(&auth),
            json!({"name": "Discuss", "description": "Needs notes"}),
        ))
        .await;
    common::read_body(response, StatusCode::OK).await;

    let response = ctx
        .send(common::request(
            "GET",
            &format!("/api/projects/{}/tasks", project_id),
            Some(&auth),
        ))
        .await;
    let tasks = common::read_json(response, StatusCode::OK).await;
    let task_id = tasks[0]["id"].as_str().expect("Task has an ID").to_string();

    // The manager writes a note
    let notes_uri = format!("/api/projects/{}/tasks/{}/notes", project_id, task_id);
    let response = ctx
        .send(common::json_request(
            "POST",
            &notes_uri,
            Some(&auth),
            json!({"content": "Looks good"}),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Note created");

    let response = ctx.send(common::request("GET", &notes_uri, Some(&auth))).await;
    let notes = common::read_json(response, StatusCode::OK).await;
    let note_id = notes[0]["id"].as_str().expect("Note has an ID").to_string();

    // A collaborator cannot delete someone else's note
    let collaborator = common::create_confirmed_user(&ctx.db).await;
    let collaborator_auth = ctx.auth_header_for(collaborator.id);
    Membership::add(
        &ctx.db,
        project_id.parse().expect("Valid UUID"),
        collaborator.id,
    )
    .await
    .expect("Failed to add member");

    let response = ctx
        .send(common::request(
            "DELETE",
            &format!("{}/{}", notes_uri, note_id),
            Some(&collaborator_auth),
        ))
        .await;
    let body = common::read_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "invalid_action");

    // The author can
    let response = ctx
        .send(common::request(
            "DELETE",
            &format!("{}/{}", notes_uri, note_id),
            Some(&auth),
        ))
        .await;
    let body = common::read_body(response, StatusCode::OK).await;
    assert_eq!(body, "Note deleted");
}
