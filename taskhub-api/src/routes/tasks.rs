/// Task CRUD and status workflow endpoints
///
/// Tasks live inside a project; every route here runs behind the project
/// (and for `:task_id` routes, the task) resolution guards. Create, update,
/// and delete are manager-only. Any authenticated user with access to the
/// project can move a task through the status workflow; each change appends
/// to the task's status history.
///
/// # Endpoints
///
/// - `POST   /api/projects/:project_id/tasks` - Create (manager only)
/// - `GET    /api/projects/:project_id/tasks` - Ordered task list
/// - `GET    /api/projects/:project_id/tasks/:task_id` - Detail with history and notes
/// - `PUT    /api/projects/:project_id/tasks/:task_id` - Update (manager only)
/// - `DELETE /api/projects/:project_id/tasks/:task_id` - Delete (manager only)
/// - `POST   /api/projects/:project_id/tasks/:task_id/status` - Change status

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::context::{CurrentUser, ManagerRights, ProjectContext, TaskContext},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::models::{
    note::{Note, NoteWithAuthor},
    task::{CreateTask, StatusChange, Task, TaskStatus, UpdateTask},
};
use validator::Validate;

/// Task create/update request body
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    /// Task name
    #[validate(length(min = 1, max = 200, message = "Task name is required"))]
    pub name: String,

    /// Free-text description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Status change request body
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// The new status
    pub status: TaskStatus,
}

/// Task detail response: the task plus its status history and notes
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    /// The task
    #[serde(flatten)]
    pub task: Task,

    /// Every status change in chronological order
    pub status_history: Vec<StatusChange>,

    /// The task's notes with author projections
    pub notes: Vec<NoteWithAuthor>,
}

/// Create a task in the project (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or requester is not the manager
pub async fn create_task(
    State(state): State<AppState>,
    rights: ManagerRights,
    Json(req): Json<TaskRequest>,
) -> ApiResult<String> {
    req.validate()?;

    Task::create(
        &state.db,
        CreateTask {
            project_id: rights.project.id,
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok("Task created".to_string())
}

/// List the project's tasks in creation order
pub async fn list_tasks(
    State(state): State<AppState>,
    ProjectContext(project): ProjectContext,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(tasks))
}

/// Fetch one task with its status history and notes
pub async fn get_task(
    State(state): State<AppState>,
    TaskContext(task): TaskContext,
) -> ApiResult<Json<TaskDetail>> {
    let status_history = Task::status_history(&state.db, task.id).await?;
    let notes = Note::list_by_task(&state.db, task.id).await?;

    Ok(Json(TaskDetail {
        task,
        status_history,
        notes,
    }))
}

/// Update a task's name and description (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or requester is not the manager
pub async fn update_task(
    State(state): State<AppState>,
    _rights: ManagerRights,
    TaskContext(task): TaskContext,
    Json(req): Json<TaskRequest>,
) -> ApiResult<String> {
    req.validate()?;

    Task::update(
        &state.db,
        task.id,
        UpdateTask {
            name: req.name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok("Task updated".to_string())
}

/// Delete a task and, via cascade, its notes and status history
/// (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Requester is not the manager
pub async fn delete_task(
    State(state): State<AppState>,
    _rights: ManagerRights,
    TaskContext(task): TaskContext,
) -> ApiResult<String> {
    Task::delete(&state.db, task.id).await?;

    Ok("Task deleted".to_string())
}

/// Move a task through the status workflow
///
/// The change and the acting user are appended to the task's status
/// history atomically with the update.
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    TaskContext(task): TaskContext,
    Json(req): Json<StatusRequest>,
) -> ApiResult<String> {
    Task::set_status(&state.db, task.id, user.id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok("Status updated".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_request_validation() {
        let valid = TaskRequest {
            name: "Write docs".to_string(),
            description: "Cover the new endpoints".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = TaskRequest {
            name: "".to_string(),
            description: "x".to_string(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_status_request_accepts_wire_format() {
        let req: StatusRequest = serde_json::from_str(r#"{"status":"inProgress"}"#)
            .expect("Should parse camelCase status");
        assert_eq!(req.status, TaskStatus::InProgress);
    }
}
