/// Task note endpoints
///
/// Notes are free-text comments on a task. Anyone with access to the task
/// can write one; only the author can delete their own note. All routes run
/// behind the task resolution guard, so a note addressed through the wrong
/// task is rejected before these handlers see it.
///
/// # Endpoints
///
/// - `POST   .../tasks/:task_id/notes` - Create a note
/// - `GET    .../tasks/:task_id/notes` - List notes, oldest first
/// - `DELETE .../tasks/:task_id/notes/:note_id` - Delete own note

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::context::{CurrentUser, TaskContext},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use taskhub_shared::models::note::{CreateNote, Note, NoteWithAuthor};
use uuid::Uuid;
use validator::Validate;

/// Note creation request
#[derive(Debug, Deserialize, Validate)]
pub struct NoteRequest {
    /// Free-text content
    #[validate(length(min = 1, message = "Note content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotePath {
    pub(crate) note_id: Uuid,
}

/// Create a note on the task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
pub async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    TaskContext(task): TaskContext,
    Json(req): Json<NoteRequest>,
) -> ApiResult<String> {
    req.validate()?;

    Note::create(
        &state.db,
        CreateNote {
            task_id: task.id,
            created_by: user.id,
            content: req.content,
        },
    )
    .await?;

    Ok("Note created".to_string())
}

/// List the task's notes with author projections, oldest first
pub async fn list_notes(
    State(state): State<AppState>,
    TaskContext(task): TaskContext,
) -> ApiResult<Json<Vec<NoteWithAuthor>>> {
    let notes = Note::list_by_task(&state.db, task.id).await?;

    Ok(Json(notes))
}

/// Delete a note the authenticated user wrote
///
/// # Errors
///
/// - `404 Not Found`: No such note
/// - `400 Bad Request`: Note hangs off a different task, or the requester
///   is not its author
pub async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    TaskContext(task): TaskContext,
    Path(NotePath { note_id }): Path<NotePath>,
) -> ApiResult<String> {
    let note = Note::find_by_id(&state.db, note_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if note.task_id != task.id {
        return Err(ApiError::InvalidAction(
            "Note does not belong to this task".to_string(),
        ));
    }

    if !note.is_authored_by(user.id) {
        return Err(ApiError::InvalidAction(
            "Only the author can delete a note".to_string(),
        ));
    }

    Note::delete(&state.db, note.id).await?;

    Ok("Note deleted".to_string())
}
