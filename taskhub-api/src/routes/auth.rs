/// Account lifecycle and session endpoints
///
/// This module provides:
/// - Registration with out-of-band confirmation codes
/// - Login returning a long-lived session JWT
/// - Password reset driven by short-lived codes
/// - Profile and password management for the authenticated user
///
/// Mutations acknowledge with a plain-text message; only `login` (the JWT)
/// and `current_user` (the profile) return structured bodies.
///
/// # Endpoints
///
/// - `POST /api/auth/create-account` - Register a new user
/// - `POST /api/auth/confirm-account` - Confirm with a 6-digit code
/// - `POST /api/auth/login` - Login and get a session token
/// - `POST /api/auth/request-code` - Re-send a confirmation code
/// - `POST /api/auth/forgot-password` - Start a password reset
/// - `POST /api/auth/validate-token` - Pre-check a reset code
/// - `POST /api/auth/update-password/:token` - Finish a password reset
/// - `GET  /api/auth/user` - Current user profile (authenticated)
/// - `PUT  /api/auth/profile` - Update name/email (authenticated)
/// - `POST /api/auth/update-password` - Change password (authenticated)
/// - `POST /api/auth/check-password` - Re-verify password (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    mailer::Mailer,
    middleware::context::CurrentUser,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use taskhub_shared::{
    auth::{jwt, password},
    models::{
        auth_token::{AuthToken, TokenPurpose},
        user::{CreateUser, User, UserSummary},
    },
};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request carrying a 6-digit code
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    /// The code the user received by email
    #[validate(length(equal = 6, message = "Token must be 6 digits"))]
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Request carrying only an email address
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// New password submitted with a reset code
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// The new password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password change request for the authenticated user
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    /// The current password, re-verified before the change
    pub current_password: String,

    /// The new password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Password re-verification request
#[derive(Debug, Deserialize)]
pub struct CheckPasswordRequest {
    /// Password to verify against the stored hash
    pub password: String,
}

fn strength_error(message: String) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: "password".to_string(),
        message,
    }])
}

/// Register a new user
///
/// Creates an unconfirmed account, issues a confirmation code, and emails
/// it to the user. The account cannot log in until confirmed.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<String> {
    req.validate()?;
    password::validate_password_strength(&req.password).map_err(strength_error)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
        },
    )
    .await?;

    let token = AuthToken::issue(&state.db, user.id, TokenPurpose::AccountConfirmation).await?;

    Mailer::new().send_confirmation_email(&user.name, &user.email, &token.token);

    Ok("Account created, check your email to confirm it".to_string())
}

/// Confirm an account with a 6-digit code
///
/// # Errors
///
/// - `404 Not Found`: Unknown or expired code
pub async fn confirm_account(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<String> {
    req.validate()?;

    let token = AuthToken::find_valid(&state.db, &req.token, TokenPurpose::AccountConfirmation)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired token".to_string()))?;

    token.consume_confirming_user(&state.db).await?;

    Ok("Account confirmed".to_string())
}

/// Login and receive a session token
///
/// An unconfirmed account is rejected, but a fresh confirmation code is
/// issued and emailed as a side effect so the user can recover without a
/// separate request.
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
/// - `401 Unauthorized`: Account not confirmed, or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<String> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !user.confirmed {
        let token = AuthToken::issue(&state.db, user.id, TokenPurpose::AccountConfirmation).await?;
        Mailer::new().send_confirmation_email(&user.name, &user.email, &token.token);

        return Err(ApiError::Unauthorized(
            "Account not confirmed, a new confirmation code was sent to your email".to_string(),
        ));
    }

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(token)
}

/// Re-send a confirmation code to an unconfirmed account
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
/// - `409 Conflict`: Account is already confirmed
pub async fn request_code(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<String> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))?;

    if user.confirmed {
        return Err(ApiError::Conflict(
            "Account is already confirmed".to_string(),
        ));
    }

    let token = AuthToken::issue(&state.db, user.id, TokenPurpose::AccountConfirmation).await?;
    Mailer::new().send_confirmation_email(&user.name, &user.email, &token.token);

    Ok("A new code was sent to your email".to_string())
}

/// Start a password reset
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<String> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))?;

    let token = AuthToken::issue(&state.db, user.id, TokenPurpose::PasswordReset).await?;
    Mailer::new().send_password_reset_email(&user.name, &user.email, &token.token);

    Ok("Check your email for instructions".to_string())
}

/// Pre-check a reset code before the user types a new password
///
/// # Errors
///
/// - `404 Not Found`: Unknown or expired code
pub async fn validate_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<String> {
    req.validate()?;

    AuthToken::find_valid(&state.db, &req.token, TokenPurpose::PasswordReset)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired token".to_string()))?;

    Ok("Valid code, set your new password".to_string())
}

/// Finish a password reset with the code from the URL
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Unknown or expired code
pub async fn reset_password(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<String> {
    req.validate()?;
    password::validate_password_strength(&req.password).map_err(strength_error)?;

    let token = AuthToken::find_valid(&state.db, &code, TokenPurpose::PasswordReset)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired token".to_string()))?;

    let password_hash = password::hash_password(&req.password)?;
    token
        .consume_resetting_password(&state.db, &password_hash)
        .await?;

    Ok("Password updated".to_string())
}

/// Return the authenticated user's profile
pub async fn current_user(CurrentUser(user): CurrentUser) -> ApiResult<Json<UserSummary>> {
    Ok(Json(user))
}

/// Update the authenticated user's name and email
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email belongs to another account
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<String> {
    req.validate()?;

    if let Some(other) = User::summary_by_email(&state.db, &req.email).await? {
        if other.id != user.id {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
    }

    User::update_profile(&state.db, user.id, &req.name, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok("Profile updated".to_string())
}

/// Change the authenticated user's password
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Current password is incorrect
pub async fn update_current_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<String> {
    req.validate()?;
    password::validate_password_strength(&req.password).map_err(strength_error)?;

    let account = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = password::verify_password(&req.current_password, &account.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    Ok("Password updated".to_string())
}

/// Re-verify the authenticated user's password
///
/// Used as a second factor before destructive operations such as deleting
/// a project.
///
/// # Errors
///
/// - `401 Unauthorized`: Incorrect password
pub async fn check_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CheckPasswordRequest>,
) -> ApiResult<String> {
    let account = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = password::verify_password(&req.password, &account.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    Ok("Correct password".to_string())
}
