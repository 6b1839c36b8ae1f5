//! Authentication configuration

use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use teamtact_common::{Config, Error};

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Lifetime of the `reset_password_token` cookie
    pub reset_cookie_ttl: Duration,
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Secret used to sign and verify tokens of the given type
    pub(crate) fn secret_for(&self, token_type: crate::TokenType) -> &[u8] {
        match token_type {
            crate::TokenType::Access => self.access_secret.as_bytes(),
            crate::TokenType::Refresh => self.refresh_secret.as_bytes(),
        }
    }

    pub(crate) fn ttl_for(&self, token_type: crate::TokenType) -> Duration {
        match token_type {
            crate::TokenType::Access => self.access_ttl,
            crate::TokenType::Refresh => self.refresh_ttl,
        }
    }
}

impl TryFrom<&Config> for AuthConfig {
    type Error = Error;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        let algorithm = Algorithm::from_str(&config.jwt_algorithm).map_err(|_| {
            Error::Internal(format!("Unknown JWT algorithm: {}", config.jwt_algorithm))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(Error::Internal(format!(
                "JWT algorithm must be HMAC based, got {}",
                config.jwt_algorithm
            )));
        }

        Ok(Self {
            access_secret: config.jwt_secret_key.clone(),
            refresh_secret: config.jwt_refresh_secret_key.clone(),
            algorithm,
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::minutes(config.refresh_token_ttl_minutes),
            reset_cookie_ttl: Duration::minutes(config.reset_token_ttl_minutes),
            cookie_secure: config.cookie_secure,
        })
    }
}
