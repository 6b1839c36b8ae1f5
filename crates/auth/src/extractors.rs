//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::backend::AuthBackend;
use crate::claims::{TokenClaims, TokenType};
use crate::context::AuthContext;
use crate::cookies::{read_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::error::AuthError;
use crate::jwt::verify_token;
use crate::types::AuthIdentity;

/// Caller authenticated by the `access_token` cookie.
///
/// Pure token verification; the store is not consulted.
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let token = read_cookie(&parts.headers, ACCESS_TOKEN_COOKIE)
            .ok_or(AuthError::MissingAccessToken)?;

        let claims = verify_token(&token, TokenType::Access, backend.config())?;
        Ok(AuthUser(AuthContext::try_from(claims)?))
    }
}

/// Authenticated caller whose account exists and is active.
///
/// Like `AuthUser` but loads the identity row. Unknown users are rejected
/// with 401, deactivated users with 403.
#[derive(Debug)]
pub struct ActiveUser(pub AuthIdentity);

impl<S> FromRequestParts<S> for ActiveUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(context) = AuthUser::from_request_parts(parts, state).await?;
        let backend = AuthBackend::from_ref(state);

        let identity = backend
            .find_identity(context.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !identity.is_active {
            return Err(AuthError::InactiveUser);
        }

        Ok(ActiveUser(identity))
    }
}

/// Verified `refresh_token` cookie, with the raw token kept for re-issuing
#[derive(Debug)]
pub struct RefreshSession {
    pub context: AuthContext,
    pub token: String,
}

impl<S> FromRequestParts<S> for RefreshSession
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let token = read_cookie(&parts.headers, REFRESH_TOKEN_COOKIE)
            .ok_or(AuthError::MissingRefreshToken)?;

        let claims: TokenClaims = verify_token(&token, TokenType::Refresh, backend.config())?;
        Ok(RefreshSession {
            context: AuthContext::try_from(claims)?,
            token,
        })
    }
}
