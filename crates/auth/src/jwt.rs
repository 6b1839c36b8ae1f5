//! JWT issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenType};
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Sign a token of the given type for `user_id`, valid for `ttl`
pub fn issue_token(
    user_id: Uuid,
    token_type: TokenType,
    ttl: Duration,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        token_type,
        iat: now,
        exp: now + ttl.num_seconds(),
    };

    let key = EncodingKey::from_secret(config.secret_for(token_type));
    encode(&Header::new(config.algorithm), &claims, &key).map_err(|e| {
        tracing::error!(error = %e, user_id = %user_id, "Failed to sign token");
        AuthError::TokenIssueFailed
    })
}

/// Short-lived token presented on every authenticated request
pub fn issue_access_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    issue_token(
        user_id,
        TokenType::Access,
        config.ttl_for(TokenType::Access),
        config,
    )
}

/// Long-lived token accepted only by the refresh endpoint
pub fn issue_refresh_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    issue_token(
        user_id,
        TokenType::Refresh,
        config.ttl_for(TokenType::Refresh),
        config,
    )
}

/// Verify signature, expiry and `type` of a token.
///
/// Each type has its own secret, so a token of the wrong type normally fails
/// the signature check and reports `InvalidToken`.
pub fn verify_token(
    token: &str,
    expected: TokenType,
    config: &AuthConfig,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(config.algorithm);
    validation.leeway = 0;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let key = DecodingKey::from_secret(config.secret_for(expected));
    let claims = decode::<TokenClaims>(token, &key, &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, token_type = %expected, "JWT validation failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired(expected),
                _ => AuthError::InvalidToken(expected),
            }
        })?
        .claims;

    // A zero TTL means the token is already spent
    if claims.exp <= Utc::now().timestamp() {
        return Err(AuthError::TokenExpired(expected));
    }

    if claims.token_type != expected {
        tracing::debug!(token_type = %claims.token_type, expected = %expected, "Token type mismatch");
        return Err(AuthError::InvalidTokenType(expected));
    }

    Ok(claims)
}
