/// Database models for TaskHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication state
/// - `auth_token`: One-time codes for account confirmation and password reset
/// - `project`: Projects, each owned by a manager
/// - `membership`: Project team membership
/// - `task`: Tasks within a project, with status history
/// - `note`: Free-text notes attached to tasks
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::user::{User, CreateUser};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: "John Doe".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod auth_token;
pub mod membership;
pub mod note;
pub mod project;
pub mod task;
pub mod user;
