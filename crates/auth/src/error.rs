//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use teamtact_common::Error;

use crate::claims::TokenType;

/// Authentication error
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    MissingAccessToken,
    MissingRefreshToken,
    TokenExpired(TokenType),
    InvalidToken(TokenType),
    InvalidTokenType(TokenType),
    InvalidUserId,
    UserNotFound,
    InactiveUser,
    UserLoadError,
    TokenIssueFailed,
}

impl AuthError {
    /// Status, machine code and client-facing message
    pub fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AuthError::MissingAccessToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_ACCESS_TOKEN",
                "Access Token not found in the Cookies!",
            ),
            AuthError::MissingRefreshToken => (
                StatusCode::BAD_REQUEST,
                "MISSING_REFRESH_TOKEN",
                "Refresh token not found in cookies",
            ),
            AuthError::TokenExpired(TokenType::Access) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Access token has expired",
            ),
            AuthError::TokenExpired(TokenType::Refresh) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Refresh token has expired",
            ),
            AuthError::InvalidToken(TokenType::Access) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid access token",
            ),
            AuthError::InvalidToken(TokenType::Refresh) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid refresh token",
            ),
            AuthError::InvalidTokenType(TokenType::Access) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid token type: expected access token",
            ),
            AuthError::InvalidTokenType(TokenType::Refresh) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid token type: expected refresh token",
            ),
            AuthError::InvalidUserId => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid user ID in token",
            ),
            AuthError::UserNotFound => {
                (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND", "User not found")
            }
            AuthError::InactiveUser => (
                StatusCode::FORBIDDEN,
                "INACTIVE_USER",
                "Your account is inactive",
            ),
            AuthError::UserLoadError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_LOAD_ERROR",
                "Failed to load user",
            ),
            AuthError::TokenIssueFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ISSUE_FAILED",
                "Failed to issue token",
            ),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.parts().2)
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "success": false,
            "message": message,
            "code": code,
            "data": null,
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        let (status, _, message) = err.parts();
        match status {
            StatusCode::FORBIDDEN => Error::Authorization(message.to_string()),
            StatusCode::INTERNAL_SERVER_ERROR => Error::Internal(message.to_string()),
            _ => Error::Authentication(message.to_string()),
        }
    }
}
