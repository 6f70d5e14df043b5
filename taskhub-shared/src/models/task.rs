/// Task model and database operations
///
/// Tasks belong to exactly one project. Each status change overwrites the
/// current `status` column and appends a row to the `task_status_events`
/// history table in the same transaction; the two are never updated
/// independently.
///
/// # State Machine
///
/// States: pending, on_hold, in_progress, under_review, completed.
/// Transitions are unrestricted: any project participant may set any state
/// from any state, and completed tasks may be reopened. This permissiveness
/// is intentional for a human-driven workflow tool.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'pending', 'on_hold', 'in_progress', 'under_review', 'completed'
/// );
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_status_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     status task_status NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::task::{Task, CreateTask, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     name: "Design".to_string(),
///     description: "Draft the first mockups".to_string(),
/// }).await?;
///
/// Task::set_status(&pool, task.id, user_id, TaskStatus::InProgress).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Task workflow status
///
/// Serialized in camelCase on the wire (`onHold`, `inProgress`, ...) and as
/// snake_case in the database enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not started
    Pending,

    /// Parked, waiting on something external
    OnHold,

    /// Actively being worked
    InProgress,

    /// Awaiting review
    UnderReview,

    /// Done (may be reopened)
    Completed,
}

impl TaskStatus {
    /// Status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::OnHold => "onHold",
            TaskStatus::InProgress => "inProgress",
            TaskStatus::UnderReview => "underReview",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Task name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning project
    pub project_id: Uuid,

    /// Task name
    pub name: String,

    /// Description
    pub description: String,
}

/// Input for updating a task's descriptive fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New task name
    pub name: String,

    /// New description
    pub description: String,
}

/// One entry of a task's status history, with the acting user projected
/// to id/name/email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    /// The status that was set
    pub status: TaskStatus,

    /// Who set it
    pub changed_by: UserSummary,

    /// When it was set
    pub created_at: DateTime<Utc>,
}

/// Flat join row backing [`StatusChange`]
#[derive(Debug, sqlx::FromRow)]
struct StatusChangeRow {
    status: TaskStatus,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    user_name: String,
    user_email: String,
}

impl From<StatusChangeRow> for StatusChange {
    fn from(row: StatusChangeRow) -> Self {
        StatusChange {
            status: row.status,
            changed_by: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            created_at: row.created_at,
        }
    }
}

impl Task {
    /// Creates a new task in the given project, status pending
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, description, status, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks in creation order
    ///
    /// This is the project's "ordered task list".
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, description, status, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task's name and description
    ///
    /// # Returns
    ///
    /// The updated task if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task and, via foreign-key cascade, all of its notes and
    /// status events
    ///
    /// # Returns
    ///
    /// True if the task existed and was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets a task's status and appends a history event atomically
    ///
    /// Repeated identical submissions from the same user are not
    /// deduplicated; every call appends an event.
    ///
    /// # Returns
    ///
    /// The updated task if found, None otherwise
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO task_status_events (task_id, user_id, status) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(user_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(task))
    }

    /// Fetches a task's status history, oldest first
    pub async fn status_history(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<StatusChange>, sqlx::Error> {
        let rows = sqlx::query_as::<_, StatusChangeRow>(
            r#"
            SELECT e.status, e.created_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email
            FROM task_status_events e
            JOIN users u ON u.id = e.user_id
            WHERE e.task_id = $1
            ORDER BY e.created_at
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(StatusChange::from).collect())
    }

    /// Whether this task belongs to the given project
    pub fn belongs_to(&self, project_id: Uuid) -> bool {
        self.project_id == project_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::OnHold).unwrap(),
            "\"onHold\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"inProgress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::UnderReview).unwrap(),
            "\"underReview\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::OnHold,
            TaskStatus::InProgress,
            TaskStatus::UnderReview,
            TaskStatus::Completed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_belongs_to() {
        let project_id = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            project_id,
            name: "Design".to_string(),
            description: "desc".to_string(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(task.belongs_to(project_id));
        assert!(!task.belongs_to(Uuid::new_v4()));
    }

    // Integration tests for CRUD, set_status atomicity, and cascade live under tests/
}
