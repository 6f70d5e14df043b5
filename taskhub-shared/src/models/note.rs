/// Note model and database operations
///
/// Notes are free-text comments attached to a task by any user with access
/// to that task. Only the author may delete a note; that predicate is
/// enforced by the handler, not here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     created_by UUID NOT NULL REFERENCES users(id),
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Note model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    /// Unique note ID
    pub id: Uuid,

    /// Owning task
    pub task_id: Uuid,

    /// Authoring user
    pub created_by: Uuid,

    /// Free-text content
    pub content: String,

    /// When the note was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    /// Owning task
    pub task_id: Uuid,

    /// Authoring user
    pub created_by: Uuid,

    /// Content
    pub content: String,
}

/// Note with its author projected to id/name/email, as returned by list
/// endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteWithAuthor {
    /// Note ID
    pub id: Uuid,

    /// Content
    pub content: String,

    /// Author
    pub created_by: UserSummary,

    /// When the note was created
    pub created_at: DateTime<Utc>,
}

/// Flat join row backing [`NoteWithAuthor`]
#[derive(Debug, sqlx::FromRow)]
struct NoteWithAuthorRow {
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    user_name: String,
    user_email: String,
}

impl From<NoteWithAuthorRow> for NoteWithAuthor {
    fn from(row: NoteWithAuthorRow) -> Self {
        NoteWithAuthor {
            id: row.id,
            content: row.content,
            created_by: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            created_at: row.created_at,
        }
    }
}

impl Note {
    /// Creates a new note on a task
    pub async fn create(pool: &PgPool, data: CreateNote) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (task_id, created_by, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, created_by, content, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.created_by)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// Finds a note by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, task_id, created_by, content, created_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Lists a task's notes with author projections, oldest first
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<NoteWithAuthor>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NoteWithAuthorRow>(
            r#"
            SELECT n.id, n.content, n.created_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email
            FROM notes n
            JOIN users u ON u.id = n.created_by
            WHERE n.task_id = $1
            ORDER BY n.created_at
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(NoteWithAuthor::from).collect())
    }

    /// Deletes a note
    ///
    /// # Returns
    ///
    /// True if the note existed and was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the given user authored this note
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authored_by() {
        let author = Uuid::new_v4();
        let note = Note {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            created_by: author,
            content: "ok".to_string(),
            created_at: Utc::now(),
        };

        assert!(note.is_authored_by(author));
        assert!(!note.is_authored_by(Uuid::new_v4()));
    }

    // Integration tests for CRUD live under tests/
}
