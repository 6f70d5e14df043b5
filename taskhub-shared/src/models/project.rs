/// Project model and database operations
///
/// Projects are the root of the resource graph. Each project is owned by a
/// single manager (the user who created it) and may have a team of member
/// users (see `models::membership`). A project's ordered task list is derived
/// from the tasks table rather than stored as an explicit reference list.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_name VARCHAR(255) NOT NULL,
///     client_name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     manager_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Cascade
///
/// Deleting a project deletes every task referencing it, and every note and
/// status event of those tasks, via `ON DELETE CASCADE` foreign keys. The
/// two-level cascade is a single atomic statement.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::project::{Project, CreateProject};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, manager_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     project_name: "Alpha".to_string(),
///     client_name: "ACME".to_string(),
///     description: "Initial engagement".to_string(),
///     manager_id,
/// }).await?;
///
/// let mine = Project::list_for_user(&pool, manager_id).await?;
/// assert!(mine.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub project_name: String,

    /// Client the project is for
    pub client_name: String,

    /// Free-text description
    pub description: String,

    /// The user who created the project and holds exclusive mutation rights
    pub manager_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub project_name: String,

    /// Client name
    pub client_name: String,

    /// Description
    pub description: String,

    /// The creating user; becomes the project's manager
    pub manager_id: Uuid,
}

/// Input for updating a project's descriptive fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New project name
    pub project_name: String,

    /// New client name
    pub client_name: String,

    /// New description
    pub description: String,
}

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (project_name, client_name, description, manager_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_name, client_name, description, manager_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.project_name)
        .bind(data.client_name)
        .bind(data.description)
        .bind(data.manager_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, project_name, client_name, description, manager_id,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects visible to a user
    ///
    /// A project is visible if the user manages it or is on its team.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.project_name, p.client_name, p.description, p.manager_id,
                   p.created_at, p.updated_at
            FROM projects p
            WHERE p.manager_id = $1
               OR EXISTS (
                    SELECT 1 FROM project_members m
                    WHERE m.project_id = p.id AND m.user_id = $1
               )
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project's descriptive fields
    ///
    /// # Returns
    ///
    /// The updated project if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET project_name = $2, client_name = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_name, client_name, description, manager_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.project_name)
        .bind(data.client_name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project and, via foreign-key cascade, all of its tasks and
    /// every note and status event attached to those tasks
    ///
    /// # Returns
    ///
    /// True if the project existed and was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the given user is this project's manager
    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.manager_id == user_id
    }
}
