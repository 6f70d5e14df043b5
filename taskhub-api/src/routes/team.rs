/// Project team management endpoints
///
/// The team roster holds the project's collaborators; the manager is not a
/// row in it. Lookup by email lets the client search for a user before
/// adding them by ID. Roster mutations are manager-only.
///
/// # Endpoints
///
/// - `POST   /api/projects/:project_id/team/find` - Look up a user by email
/// - `GET    /api/projects/:project_id/team` - List collaborators
/// - `POST   /api/projects/:project_id/team` - Add by user ID (manager only)
/// - `DELETE /api/projects/:project_id/team/:user_id` - Remove (manager only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::context::{ManagerRights, ProjectContext},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use taskhub_shared::models::{membership::Membership, user::{User, UserSummary}};
use uuid::Uuid;
use validator::Validate;

/// User lookup request
#[derive(Debug, Deserialize, Validate)]
pub struct FindMemberRequest {
    /// Email to search for
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Add-member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// ID of the user to add, as returned by the lookup endpoint
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberPath {
    pub(crate) user_id: Uuid,
}

/// Look up a user by email for the add-member flow
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: No account with that email
pub async fn find_member(
    State(state): State<AppState>,
    Json(req): Json<FindMemberRequest>,
) -> ApiResult<Json<UserSummary>> {
    req.validate()?;

    let user = User::summary_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// List the project's collaborators
pub async fn list_team(
    State(state): State<AppState>,
    ProjectContext(project): ProjectContext,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let team = Membership::list_team(&state.db, project.id).await?;

    Ok(Json(team))
}

/// Add a collaborator to the project (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Requester is not the manager
/// - `404 Not Found`: No such user
/// - `409 Conflict`: User is already on the team
pub async fn add_member(
    State(state): State<AppState>,
    rights: ManagerRights,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<String> {
    User::summary_by_id(&state.db, req.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if Membership::is_member(&state.db, rights.project.id, req.id).await? {
        return Err(ApiError::Conflict(
            "User is already on the project team".to_string(),
        ));
    }

    Membership::add(&state.db, rights.project.id, req.id).await?;

    Ok("Member added".to_string())
}

/// Remove a collaborator from the project (manager only)
///
/// # Errors
///
/// - `400 Bad Request`: Requester is not the manager
/// - `409 Conflict`: User is not on the team
pub async fn remove_member(
    State(state): State<AppState>,
    rights: ManagerRights,
    Path(MemberPath { user_id }): Path<MemberPath>,
) -> ApiResult<String> {
    let removed = Membership::remove(&state.db, rights.project.id, user_id).await?;
    if !removed {
        return Err(ApiError::Conflict(
            "User is not on the project team".to_string(),
        ));
    }

    Ok("Member removed".to_string())
}
