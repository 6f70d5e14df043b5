/// Project team membership
///
/// Relates users to projects as team members. The manager is not stored here;
/// manager rights come from `projects.manager_id`. The composite primary key
/// guarantees a user appears in a team at most once, and duplicate inserts
/// are rejected before hitting the constraint so callers can map them to a
/// conflict response.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Team membership operations, namespaced like a model
///
/// There is no standalone membership row type worth returning; callers only
/// ever need the member list (as user summaries) and the set predicates.
pub struct Membership;

impl Membership {
    /// Whether a user is on a project's team
    pub async fn is_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Adds a user to a project's team
    ///
    /// Callers are expected to have checked [`Membership::is_member`] first
    /// and mapped a duplicate to a conflict.
    pub async fn add(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO project_members (project_id, user_id) VALUES ($1, $2)")
            .bind(project_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Removes a user from a project's team
    ///
    /// # Returns
    ///
    /// True if the user was a member and has been removed
    pub async fn remove(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a project's team members as minimal user projections
    pub async fn list_team(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email
            FROM project_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.added_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

// Integration tests for membership predicates live under tests/
