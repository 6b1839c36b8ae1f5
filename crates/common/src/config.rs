//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables once at start-up
//! and handed to each component explicitly.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// JWT signing
    pub jwt_secret_key: String,
    pub jwt_refresh_secret_key: String,
    pub jwt_algorithm: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,

    /// Single-use tokens and invitations
    pub reset_token_ttl_minutes: i64,
    pub verification_token_ttl_hours: i64,
    pub invitation_expiry_days: i64,
    pub invitation_sweep_interval_secs: u64,

    /// Cookies and links
    pub cookie_secure: bool,
    pub frontend_domain: String,

    pub bcrypt_cost: u32,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    #[mutants::skip] // Reads the process environment; from_lookup carries the logic
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required =
            |key: &str| lookup(key).ok_or_else(|| anyhow!("{} is required", key));
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            database_url: required("DATABASE_URL")?,

            jwt_secret_key: required("JWT_SECRET_KEY")?,
            jwt_refresh_secret_key: required("JWT_REFRESH_SECRET_KEY")?,
            jwt_algorithm: or_default("JWT_ALGORITHM", "HS256"),
            access_token_ttl_minutes: parse_or(&lookup, "ACCESS_TOKEN_EXPIRATION_TIME", 30)?,
            refresh_token_ttl_minutes: parse_or(&lookup, "REFRESH_TOKEN_EXPIRATION_TIME", 10080)?,

            reset_token_ttl_minutes: parse_or(&lookup, "AUTH_TOKEN_EXPIRY_MINUTES", 60)?,
            verification_token_ttl_hours: parse_or(
                &lookup,
                "EMAIL_VERIFICATION_EXPIRY_HOURS",
                24,
            )?,
            invitation_expiry_days: parse_or(&lookup, "INVITATION_EXPIRY_DAYS", 3)?,
            invitation_sweep_interval_secs: parse_or(
                &lookup,
                "INVITATION_SWEEP_INTERVAL_SECS",
                3600,
            )?,

            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            frontend_domain: or_default("FRONTEND_DOMAIN", "http://localhost:5173/"),

            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", 12)?,

            rust_log: or_default("RUST_LOG", "teamtact=debug"),
            port: parse_or(&lookup, "PORT", 8000)?,
        };

        if config.jwt_secret_key == config.jwt_refresh_secret_key {
            return Err(anyhow!(
                "JWT_SECRET_KEY and JWT_REFRESH_SECRET_KEY must be different"
            ));
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
