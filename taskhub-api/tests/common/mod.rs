/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (skipped entirely when DATABASE_URL is not set)
/// - Confirmed test user creation
/// - JWT token generation
/// - Request and response helpers

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskhub_shared::auth::jwt::{create_token, Claims};
use taskhub_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context, or None when DATABASE_URL is not set
    pub async fn new() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;

        let db = PgPool::connect(&url).await.expect("Failed to connect");

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../taskhub-shared/migrations")
            .run(&db)
            .await
            .expect("Failed to migrate");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let user = create_confirmed_user(&db).await;

        let claims = Claims::new(user.id);
        let jwt_token = create_token(&claims, TEST_JWT_SECRET).expect("Failed to create token");

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Some(TestContext {
            db,
            app,
            user,
            jwt_token,
        })
    }

    /// Returns the authorization header value for the context's user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Returns an authorization header for an arbitrary user
    pub fn auth_header_for(&self, user_id: Uuid) -> String {
        let claims = Claims::new(user_id);
        let token = create_token(&claims, TEST_JWT_SECRET).expect("Failed to create token");
        format!("Bearer {}", token)
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .call(request)
            .await
            .expect("Request failed")
    }
}

/// Creates a confirmed user ready to authenticate
pub async fn create_confirmed_user(db: &PgPool) -> User {
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: "$argon2id$test".to_string(),
            name: "Test User".to_string(),
        },
    )
    .await
    .expect("Failed to create user");

    sqlx::query("UPDATE users SET confirmed = TRUE WHERE id = $1")
        .bind(user.id)
        .execute(db)
        .await
        .expect("Failed to confirm user");

    user
}

/// Builds a JSON request
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// Builds a bodyless request
pub fn request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::empty()).expect("Failed to build request")
}

/// Reads a response body as a string, asserting the expected status
pub async fn read_body(response: Response<Body>, expected: StatusCode) -> String {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let text = String::from_utf8_lossy(&body).to_string();

    assert_eq!(status, expected, "Unexpected status, body: {}", text);

    text
}

/// Reads a response body as JSON, asserting the expected status
pub async fn read_json(response: Response<Body>, expected: StatusCode) -> serde_json::Value {
    let text = read_body(response, expected).await;
    serde_json::from_str(&text).expect("Body should be JSON")
}
