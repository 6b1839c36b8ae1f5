//! Route definitions for Teams domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{auth, invitations, members, teams};
use super::middleware::TeamsState;

/// Create account and session routes
fn auth_routes() -> Router<TeamsState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", get(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route(
            "/auth/request-reset-password",
            post(auth::request_reset_password),
        )
        .route(
            "/auth/validate-reset-password-token",
            post(auth::validate_reset_password_token),
        )
        .route(
            "/auth/confirm-reset-password",
            post(auth::confirm_reset_password),
        )
        .route("/auth/verify-email", post(auth::verify_email))
        .route(
            "/auth/resend-verification-email",
            post(auth::resend_verification_email),
        )
}

/// Create team management routes
fn team_routes() -> Router<TeamsState> {
    Router::new()
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/autogenerate-code", get(teams::autogenerate_code))
        .route("/teams/validate-code", post(teams::validate_code))
        .route(
            "/teams/{id}",
            get(teams::get_team).delete(teams::delete_team),
        )
        .route("/teams/{id}/members", get(members::list_members))
        .route("/teams/{id}/invite", post(invitations::invite_members))
}

/// Create invitation routes
///
/// `{id}` is a team id for GET and POST and an invitation id for DELETE.
fn invitation_routes() -> Router<TeamsState> {
    Router::new()
        .route(
            "/team-invitations/{id}",
            get(invitations::list_invitations)
                .post(invitations::invite_members)
                .delete(invitations::delete_invitation),
        )
        .route(
            "/team-invitations/accept/{token}",
            post(invitations::accept_invitation),
        )
        .route(
            "/team-invitations/{id}/cancel",
            post(invitations::cancel_invitation),
        )
}

/// Create all Teams domain API routes
pub fn routes() -> Router<TeamsState> {
    Router::new()
        .merge(auth_routes())
        .merge(team_routes())
        .merge(invitation_routes())
}
