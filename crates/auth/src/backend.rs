//! Concrete authentication backend
//!
//! Wraps `PgPool` + `AuthConfig` and owns auth-specific SQL queries.
//! Uses runtime `sqlx::query_as` (not macros) so the crate builds without
//! a database.

use axum::http::HeaderValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::cookies;
use crate::error::AuthError;
use crate::jwt::{issue_access_token, issue_refresh_token};
use crate::types::AuthIdentity;

/// Freshly signed token pair plus the cookies that carry it
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub cookies: [HeaderValue; 2],
}

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Find a user identity by ID
    #[mutants::skip] // Plain lookup, exercised by the database-backed integration tests
    pub async fn find_identity(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        let user: Option<AuthIdentity> = sqlx::query_as(
            r#"
            SELECT id, fullname, email, username, is_active, email_verified
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })?;

        Ok(user)
    }

    /// Sign a new access/refresh pair for `user_id`
    pub fn issue_session(&self, user_id: Uuid) -> Result<SessionTokens, AuthError> {
        let access_token = issue_access_token(user_id, &self.config)?;
        let refresh_token = issue_refresh_token(user_id, &self.config)?;
        let cookies = cookies::session_cookies(&access_token, &refresh_token, &self.config)?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            cookies,
        })
    }

    /// New access token for the holder of a still-valid refresh token.
    ///
    /// The refresh token is re-sent unchanged, not rotated.
    pub fn refresh_session(
        &self,
        user_id: Uuid,
        refresh_token: String,
    ) -> Result<SessionTokens, AuthError> {
        let access_token = issue_access_token(user_id, &self.config)?;
        let cookies = cookies::session_cookies(&access_token, &refresh_token, &self.config)?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            cookies,
        })
    }
}
