/// API route handlers
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `auth`: Account lifecycle and session endpoints
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD and status workflow
/// - `team`: Project team management
/// - `notes`: Task notes

pub mod auth;
pub mod health;
pub mod notes;
pub mod projects;
pub mod tasks;
pub mod team;
