//! Auth cookie encoding
//!
//! Cookies are plain `Set-Cookie` header values: `HttpOnly`, `SameSite=Lax`,
//! path `/`, and `Secure` when configured.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use chrono::Duration;

use crate::config::AuthConfig;
use crate::error::AuthError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const RESET_PASSWORD_COOKIE: &str = "reset_password_token";

/// Value of the named cookie in the request, if present and non-empty
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().unwrap_or_default().trim();
            let val = parts.next().unwrap_or_default().trim();
            if key == name && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

/// Build a `Set-Cookie` value that lives for `max_age`
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    secure: bool,
) -> Result<HeaderValue, AuthError> {
    let mut cookie = format!(
        "{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.num_seconds().max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!(error = %e, cookie = name, "Invalid cookie value");
        AuthError::TokenIssueFailed
    })
}

/// Expire the named cookie immediately
pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, AuthError> {
    build_cookie(name, "", Duration::zero(), secure)
}

/// The `access_token` and `refresh_token` cookies for a session
pub fn session_cookies(
    access_token: &str,
    refresh_token: &str,
    config: &AuthConfig,
) -> Result<[HeaderValue; 2], AuthError> {
    Ok([
        build_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token,
            config.access_ttl,
            config.cookie_secure,
        )?,
        build_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            config.refresh_ttl,
            config.cookie_secure,
        )?,
    ])
}

pub fn reset_password_cookie(code: &str, config: &AuthConfig) -> Result<HeaderValue, AuthError> {
    build_cookie(
        RESET_PASSWORD_COOKIE,
        code,
        config.reset_cookie_ttl,
        config.cookie_secure,
    )
}

/// Clears every auth cookie on logout
pub fn clear_all(config: &AuthConfig) -> Result<[HeaderValue; 3], AuthError> {
    Ok([
        clear_cookie(ACCESS_TOKEN_COOKIE, config.cookie_secure)?,
        clear_cookie(REFRESH_TOKEN_COOKIE, config.cookie_secure)?,
        clear_cookie(RESET_PASSWORD_COOKIE, config.cookie_secure)?,
    ])
}
