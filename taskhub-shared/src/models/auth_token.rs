/// One-time auth token model
///
/// This module persists the short-lived codes mailed to users. Each token is
/// bound to exactly one user and carries an explicit purpose tag, so a
/// password-reset code can never confirm an account (and vice versa). Tokens
/// expire one hour after issue and are deleted when consumed.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE token_purpose AS ENUM ('account_confirmation', 'password_reset');
///
/// CREATE TABLE auth_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token VARCHAR(6) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     purpose token_purpose NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::auth_token::{AuthToken, TokenPurpose};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let token = AuthToken::issue(&pool, user_id, TokenPurpose::AccountConfirmation).await?;
///
/// // Later, when the code comes back from the user:
/// if let Some(t) = AuthToken::find_valid(&pool, &token.token, TokenPurpose::AccountConfirmation).await? {
///     t.consume_confirming_user(&pool).await?;
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::generate_code;

/// How long an issued token stays valid
const TOKEN_TTL_HOURS: i64 = 1;

/// What an issued token may be used for
///
/// The purpose is checked at lookup time, so a code issued for one flow
/// cannot be replayed in the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Confirms a freshly registered (or still unconfirmed) account
    AccountConfirmation,

    /// Authorizes setting a new password without knowing the old one
    PasswordReset,
}

/// A persisted one-time code bound to a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    /// Unique token row ID
    pub id: Uuid,

    /// The six-digit code the user receives by email
    pub token: String,

    /// Owning user
    pub user_id: Uuid,

    /// What this token may be used for
    pub purpose: TokenPurpose,

    /// Hard expiry; tokens past this instant are never returned by lookups
    pub expires_at: DateTime<Utc>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Issues a fresh token for a user
    ///
    /// Generates a random six-digit code and stores it with a one-hour expiry.
    /// Issuing does not invalidate earlier tokens; each is independently
    /// consumable until it expires.
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Self, sqlx::Error> {
        let code = generate_code();
        let expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);

        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (token, user_id, purpose, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token, user_id, purpose, expires_at, created_at
            "#,
        )
        .bind(code)
        .bind(user_id)
        .bind(purpose)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Looks up a live token by its code and purpose
    ///
    /// Expired tokens and tokens issued for a different purpose are treated
    /// as nonexistent.
    pub async fn find_valid(
        pool: &PgPool,
        code: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT id, token, user_id, purpose, expires_at, created_at
            FROM auth_tokens
            WHERE token = $1 AND purpose = $2 AND expires_at > NOW()
            "#,
        )
        .bind(code)
        .bind(purpose)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Consumes this token, confirming its user's account
    ///
    /// The confirmed flag update and the token deletion happen in one
    /// transaction; a failure leaves both untouched.
    pub async fn consume_confirming_user(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE users SET confirmed = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(self.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(self.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    /// Consumes this token, replacing its user's password hash
    ///
    /// The password update and the token deletion happen in one transaction.
    pub async fn consume_resetting_password(
        &self,
        pool: &PgPool,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(self.user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(self.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}
