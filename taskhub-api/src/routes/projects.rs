/// Project CRUD endpoints
///
/// A project is created by its manager; collaborators join through the team
/// endpoints. Listing returns every project the user manages or collaborates
/// on. Mutations are manager-only, enforced by the
/// [`ManagerRights`](crate::middleware::context::ManagerRights) extractor.
///
/// # Endpoints
///
/// - `POST   /api/projects` - Create a project
/// - `GET    /api/projects` - List accessible projects
/// - `GET    /api/projects/:project_id` - Project detail with its tasks
/// - `PUT    /api/projects/:project_id` - Update (manager only)
/// - `DELETE /api/projects/:project_id` - Delete (manager only, cascades)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::context::{CurrentUser, ManagerRights, ProjectContext},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::models::{
    membership::Membership,
    project::{CreateProject, Project, UpdateProject},
    task::Task,
};
use validator::Validate;

/// Project create/update request body
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub project_name: String,

    /// Client name
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,

    /// Free-text description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Project detail response: the project plus its ordered task list
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    /// The project
    #[serde(flatten)]
    pub project: Project,

    /// The project's tasks in creation order
    pub tasks: Vec<Task>,
}

/// Create a project managed by the authenticated user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<String> {
    req.validate()?;

    Project::create(
        &state.db,
        CreateProject {
            project_name: req.project_name,
            client_name: req.client_name,
            description: req.description,
            manager_id: user.id,
        },
    )
    .await?;

    Ok("Project created".to_string())
}

/// List every project the user manages or collaborates on
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_user(&state.db, user.id).await?;

    Ok(Json(projects))
}

/// Fetch one project with its ordered task list
///
/// # Errors
///
/// - `400 Bad Request`: Requester is neither the manager nor on the team
pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ProjectContext(project): ProjectContext,
) -> ApiResult<Json<ProjectDetail>> {
    let allowed = project.is_managed_by(user.id)
        || Membership::is_member(&state.db, project.id, user.id).await?;
    if !allowed {
        return Err(ApiError::InvalidAction(
            "You do not have access to this project".to_string(),
        ));
    }

    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(ProjectDetail { project, tasks }))
}

/// Update a project's descriptive fields (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or requester is not the manager
pub async fn update_project(
    State(state): State<AppState>,
    rights: ManagerRights,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<String> {
    req.validate()?;

    Project::update(
        &state.db,
        rights.project.id,
        UpdateProject {
            project_name: req.project_name,
            client_name: req.client_name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok("Project updated".to_string())
}

/// Delete a project and, via cascade, its tasks, notes, status history,
/// and team roster (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Requester is not the manager
pub async fn delete_project(
    State(state): State<AppState>,
    rights: ManagerRights,
) -> ApiResult<String> {
    Project::delete(&state.db, rights.project.id).await?;

    Ok("Project deleted".to_string())
}
