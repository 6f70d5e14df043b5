/// Request guards for the API server
///
/// # Modules
///
/// - `context`: entity resolution layers and typed request-context extractors

pub mod context;
