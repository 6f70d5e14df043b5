/// Entity resolution layers and typed request-context extractors
///
/// Routes under `/api/projects/:project_id` run behind [`project_context_layer`],
/// which resolves the project once and stores it in request extensions.
/// Routes under `.../tasks/:task_id` additionally run behind
/// [`task_context_layer`], which resolves the task and verifies it belongs to
/// the already-resolved project. Handlers then receive the entities through
/// the extractors below instead of re-querying or trusting raw path IDs.
///
/// Extraction order per request:
///
/// ```text
/// jwt_auth_layer            -> UserSummary in extensions
///   project_context_layer   -> Project in extensions (404 if absent)
///     task_context_layer    -> Task in extensions (404 if absent,
///                              400 if it belongs to another project)
///       handler             -> CurrentUser / ProjectContext / TaskContext /
///                              ManagerRights extractors
/// ```

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use taskhub_shared::models::{project::Project, task::Task, user::UserSummary};
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectPath {
    pub(crate) project_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskPath {
    pub(crate) task_id: Uuid,
}

/// Resolves `:project_id` and stores the project in request extensions
///
/// Rejects with 404 when no such project exists. Access checks (membership,
/// manager rights) are left to the handlers and extractors behind this layer.
pub async fn project_context_layer(
    state: State<AppState>,
    Path(ProjectPath { project_id }): Path<ProjectPath>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    req.extensions_mut().insert(project);

    Ok(next.run(req).await)
}

/// Resolves `:task_id` and stores the task in request extensions
///
/// Runs inside [`project_context_layer`], so the project is already resolved.
/// A task that exists but hangs off a different project is rejected with 400
/// rather than 404: the task is real, the URL is lying about its parent.
pub async fn task_context_layer(
    state: State<AppState>,
    Path(TaskPath { task_id }): Path<TaskPath>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let project = req
        .extensions()
        .get::<Project>()
        .cloned()
        .ok_or_else(|| ApiError::InternalError("Project context missing".to_string()))?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !task.belongs_to(project.id) {
        return Err(ApiError::InvalidAction(
            "Task does not belong to this project".to_string(),
        ));
    }

    req.extensions_mut().insert(task);

    Ok(next.run(req).await)
}

/// The authenticated user, as resolved by the JWT layer
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserSummary);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserSummary>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// The project resolved from the request path
#[derive(Debug, Clone)]
pub struct ProjectContext(pub Project);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ProjectContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Project>()
            .cloned()
            .map(ProjectContext)
            .ok_or_else(|| ApiError::InternalError("Project context missing".to_string()))
    }
}

/// The task resolved from the request path
#[derive(Debug, Clone)]
pub struct TaskContext(pub Task);

#[axum::async_trait]
impl<S> FromRequestParts<S> for TaskContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Task>()
            .cloned()
            .map(TaskContext)
            .ok_or_else(|| ApiError::InternalError("Task context missing".to_string()))
    }
}

/// Guard extractor proving the authenticated user manages the resolved project
///
/// Declaring this as a handler argument is what restricts an endpoint to the
/// project manager; collaborators get a 400 before the handler body runs.
#[derive(Debug, Clone)]
pub struct ManagerRights {
    /// The manager (also the authenticated user)
    pub user: UserSummary,

    /// The project they manage
    pub project: Project,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ManagerRights
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        let ProjectContext(project) = ProjectContext::from_request_parts(parts, state).await?;

        if !project.is_managed_by(user.id) {
            return Err(ApiError::InvalidAction(
                "Only the project manager can perform this action".to_string(),
            ));
        }

        Ok(ManagerRights { user, project })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use chrono::Utc;

    fn summary(id: Uuid) -> UserSummary {
        UserSummary {
            id,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        }
    }

    fn project(manager_id: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            project_name: "Launch".to_string(),
            client_name: "Acme".to_string(),
            description: "Launch plan".to_string(),
            manager_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_current_user_missing_is_unauthorized() {
        let (mut parts, _) = HttpRequest::new(()).into_parts();
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_manager_rights_granted_to_manager() {
        let user_id = Uuid::new_v4();
        let (mut parts, _) = HttpRequest::new(()).into_parts();
        parts.extensions.insert(summary(user_id));
        parts.extensions.insert(project(user_id));

        let rights = ManagerRights::from_request_parts(&mut parts, &()).await;
        assert!(rights.is_ok());
    }

    #[tokio::test]
    async fn test_manager_rights_denied_to_collaborator() {
        let (mut parts, _) = HttpRequest::new(()).into_parts();
        parts.extensions.insert(summary(Uuid::new_v4()));
        parts.extensions.insert(project(Uuid::new_v4()));

        let result = ManagerRights::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::InvalidAction(_))));
    }
}
