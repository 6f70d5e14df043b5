/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::{auth::jwt, models::user::User};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                                # Health check (public)
/// └── /api/
///     ├── /auth/                             # Account lifecycle
///     │   ├── POST /create-account           # (public)
///     │   ├── POST /confirm-account
///     │   ├── POST /login
///     │   ├── POST /request-code
///     │   ├── POST /forgot-password
///     │   ├── POST /validate-token
///     │   ├── POST /update-password/:token
///     │   ├── GET  /user                     # (authenticated)
///     │   ├── PUT  /profile
///     │   ├── POST /update-password
///     │   └── POST /check-password
///     └── /projects/                         # (all authenticated)
///         ├── POST /                         # Create project
///         ├── GET  /                         # List accessible projects
///         └── /:project_id/                  # Project resolution guard
///             ├── GET/PUT/DELETE /
///             ├── /tasks, /tasks/:task_id/   # Task resolution guard
///             │   └── /notes, /notes/:note_id
///             └── /team, /team/find, /team/:user_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication + entity resolution (per-subtree basis)
pub fn build_router(state: AppState) -> Router {
    use crate::{middleware::context, routes};

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account lifecycle routes (public, no auth required)
    let auth_public = Router::new()
        .route("/create-account", post(routes::auth::create_account))
        .route("/confirm-account", post(routes::auth::confirm_account))
        .route("/login", post(routes::auth::login))
        .route("/request-code", post(routes::auth::request_code))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/validate-token", post(routes::auth::validate_token))
        .route(
            "/update-password/:token",
            post(routes::auth::reset_password),
        );

    // Session routes (require JWT authentication)
    let auth_private = Router::new()
        .route("/user", get(routes::auth::current_user))
        .route("/profile", put(routes::auth::update_profile))
        .route(
            "/update-password",
            post(routes::auth::update_current_password),
        )
        .route("/check-password", post(routes::auth::check_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = auth_public.merge(auth_private);

    // Task-scoped routes: the resolution guard loads the task, verifies it
    // belongs to the resolved project, and stores it in request extensions
    let task_scoped = Router::new()
        .route(
            "/",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/status", post(routes::tasks::update_status))
        .route(
            "/notes",
            post(routes::notes::create_note).get(routes::notes::list_notes),
        )
        .route("/notes/:note_id", delete(routes::notes::delete_note))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            context::task_context_layer,
        ));

    // Project-scoped routes: the resolution guard loads the project and
    // stores it in request extensions
    let project_scoped = Router::new()
        .route(
            "/",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .nest("/tasks/:task_id", task_scoped)
        .route(
            "/team",
            get(routes::team::list_team).post(routes::team::add_member),
        )
        .route("/team/find", post(routes::team::find_member))
        .route("/team/:user_id", delete(routes::team::remove_member))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            context::project_context_layer,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .nest("/:project_id", project_scoped)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete API
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/projects", project_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization header,
/// resolves the user it names, and injects a [`taskhub_shared::models::user::UserSummary`]
/// into request extensions. A token whose user no longer exists is rejected
/// the same way as a malformed one.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // Resolve the user behind the token
    let user = User::summary_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Invalid token".to_string()))?;

    // Insert into request extensions
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
