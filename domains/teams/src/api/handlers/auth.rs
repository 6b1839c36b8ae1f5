//! Account and session API handlers
//!
//! Implements:
//! - POST /auth/signup
//! - POST /auth/login
//! - POST /auth/logout
//! - GET  /auth/refresh
//! - GET  /auth/me
//! - POST /auth/request-reset-password
//! - POST /auth/validate-reset-password-token
//! - POST /auth/confirm-reset-password
//! - POST /auth/verify-email
//! - POST /auth/resend-verification-email

use axum::{extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use teamtact_auth::{
    cookies::{self, RESET_PASSWORD_COOKIE},
    ActiveUser, AuthIdentity, RefreshSession,
};
use teamtact_common::{
    hash_password, verify_password, ApiResponse, Error, RepositoryError, Result, ValidatedJson,
};
use teamtact_email::dispatch;
use validator::Validate;

use crate::api::middleware::TeamsState;
use crate::{TokenPurpose, User};

const ACCOUNT_TAKEN: &str = "Email or Username already taken!";
const INVALID_CREDENTIALS: &str = "Invalid Credentials";

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub fullname: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 3, max = 30))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Body carrying only an email address
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateResetTokenRequest {
    #[validate(length(min = 1))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmResetRequest {
    /// Falls back to the `reset_password_token` cookie when absent
    pub token: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// bcrypt is CPU-bound; keep it off the async workers
async fn hash_blocking(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_blocking(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))?
}

/// Issue a verification code for `user` and mail it in the background
async fn send_verification(state: &TeamsState, user: &User) -> Result<()> {
    let code = state
        .repos
        .tokens
        .issue(user.id, TokenPurpose::EmailVerification)
        .await?;

    let email = state.email.clone();
    let to = user.email.clone();
    let fullname = user.fullname.clone();
    let hours = state.settings.token_ttls.email_verification.num_hours();
    dispatch("email_verification", async move {
        email
            .send_verification_email(&to, &fullname, &code, hours)
            .await
    });

    Ok(())
}

/// POST /auth/signup
///
/// A failure to issue the verification code is logged, not returned: the
/// account is already stored and `resend-verification-email` issues a new one.
pub async fn signup(
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<ApiResponse<User>> {
    if state
        .repos
        .users
        .exists_by_email_or_username(&request.email, &request.username)
        .await?
    {
        return Err(Error::Conflict(ACCOUNT_TAKEN.to_string()));
    }

    let password_hash = hash_blocking(request.password, state.settings.bcrypt_cost).await?;
    let user = User::new(
        request.fullname,
        request.email,
        request.username,
        password_hash,
    )?;

    let user = state
        .repos
        .users
        .create(&user)
        .await
        .map_err(|e| match e {
            RepositoryError::AlreadyExists => Error::Conflict(ACCOUNT_TAKEN.to_string()),
            other => other.into(),
        })?;

    if let Err(e) = send_verification(&state, &user).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to issue verification token at signup");
    }

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(ApiResponse::created(
        "Signup successful, please check your email for verification!",
        user,
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<User>> {
    let user = state
        .repos
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Authentication(INVALID_CREDENTIALS.to_string()))?;

    if !verify_blocking(request.password, user.password_hash.clone()).await? {
        return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
    }

    user.check_can_login()?;

    let session = state.auth.issue_session(user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiResponse::ok("Login successful", user).with_cookies(session.cookies))
}

/// POST /auth/logout
pub async fn logout(State(state): State<TeamsState>) -> Result<ApiResponse<()>> {
    let cleared = cookies::clear_all(state.auth.config())?;
    tracing::info!("User logged out");
    Ok(ApiResponse::message("Logged out successfully").with_cookies(cleared))
}

/// GET /auth/refresh
pub async fn refresh(
    State(state): State<TeamsState>,
    session: RefreshSession,
) -> Result<ApiResponse<RefreshResponse>> {
    let tokens = state
        .auth
        .refresh_session(session.context.user_id, session.token)?;

    Ok(ApiResponse::ok(
        "Access token refreshed successfully",
        RefreshResponse {
            access_token: tokens.access_token,
        },
    )
    .with_cookies(tokens.cookies))
}

/// GET /auth/me
pub async fn me(ActiveUser(identity): ActiveUser) -> ApiResponse<AuthIdentity> {
    ApiResponse::ok("User Profile Retrieved successfully!", identity)
}

/// POST /auth/request-reset-password
///
/// Answers the same way whether or not the account exists.
pub async fn request_reset_password(
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<ApiResponse<()>> {
    if let Some(user) = state.repos.users.find_by_email(&request.email).await? {
        let code = state
            .repos
            .tokens
            .issue(user.id, TokenPurpose::ResetPassword)
            .await?;

        let email = state.email.clone();
        let minutes = state.settings.token_ttls.reset_password.num_minutes();
        dispatch("password_reset", async move {
            email
                .send_password_reset(&user.email, &user.fullname, &code, minutes)
                .await
        });
    }

    Ok(ApiResponse::message(
        "If the email exists, a password reset link has been sent",
    ))
}

/// POST /auth/validate-reset-password-token
///
/// Checks the code without consuming it and stores it in the reset cookie.
pub async fn validate_reset_password_token(
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<ValidateResetTokenRequest>,
) -> Result<ApiResponse<()>> {
    state
        .repos
        .tokens
        .peek(
            &request.code,
            TokenPurpose::ResetPassword,
            state.settings.token_ttls.ttl(TokenPurpose::ResetPassword),
        )
        .await?;

    let cookie = cookies::reset_password_cookie(&request.code, state.auth.config())?;
    Ok(ApiResponse::message("Reset token is valid").with_cookie(cookie))
}

/// POST /auth/confirm-reset-password
pub async fn confirm_reset_password(
    State(state): State<TeamsState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<ConfirmResetRequest>,
) -> Result<ApiResponse<()>> {
    let code = request
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| cookies::read_cookie(&headers, RESET_PASSWORD_COOKIE))
        .ok_or_else(|| Error::Validation("Reset token is required".to_string()))?;

    let user_id = state
        .repos
        .tokens
        .consume(
            &code,
            TokenPurpose::ResetPassword,
            state.settings.token_ttls.ttl(TokenPurpose::ResetPassword),
        )
        .await?;

    let password_hash = hash_blocking(request.new_password, state.settings.bcrypt_cost).await?;
    state
        .repos
        .users
        .update_password(user_id, &password_hash)
        .await?;

    tracing::info!(user_id = %user_id, "Password reset");

    let cleared =
        cookies::clear_cookie(RESET_PASSWORD_COOKIE, state.auth.config().cookie_secure)?;
    Ok(ApiResponse::message("Password reset successful").with_cookie(cleared))
}

/// POST /auth/verify-email
pub async fn verify_email(
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<VerifyEmailRequest>,
) -> Result<ApiResponse<()>> {
    let user_id = state
        .repos
        .tokens
        .consume(
            &request.token,
            TokenPurpose::EmailVerification,
            state.settings.token_ttls.ttl(TokenPurpose::EmailVerification),
        )
        .await?;

    state.repos.users.mark_email_verified(user_id).await?;

    tracing::info!(user_id = %user_id, "Email verified");

    Ok(ApiResponse::message("Email verified successfully!"))
}

/// POST /auth/resend-verification-email
///
/// Answers the same way whether or not the account exists.
pub async fn resend_verification_email(
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<ApiResponse<()>> {
    if let Some(user) = state.repos.users.find_by_email(&request.email).await? {
        if !user.email_verified {
            send_verification(&state, &user).await?;
        }
    }

    Ok(ApiResponse::message(
        "If the account exists and is not yet verified, a verification email has been sent",
    ))
}
