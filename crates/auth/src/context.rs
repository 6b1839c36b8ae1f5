//! Authenticated request context

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::claims::TokenClaims;
use crate::error::AuthError;

/// Identity resolved from a verified access token. No database lookup is involved.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<TokenClaims> for AuthContext {
    type Error = AuthError;

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;
        let issued_at =
            DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::InvalidUserId)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidUserId)?;

        Ok(Self {
            user_id,
            issued_at,
            expires_at,
        })
    }
}
