//! TeamTact application composition root
//!
//! Composes the domain routers with the shared HTTP layers and owns the
//! background sweeper for expired invitations.

pub mod sweeper;

use anyhow::Context;
use axum::Router;
use sqlx::PgPool;
use teamtact_common::Config;
use teamtact_email::{EmailConfig, EmailServiceFactory};
use teamtact_teams::TeamsState;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Version banner served at `/`
pub const BANNER: &str = concat!("TeamTact API v", env!("CARGO_PKG_VERSION"));

/// Create the main application router with all routes and middleware
pub async fn create_app(config: &Config, pool: PgPool) -> anyhow::Result<Router> {
    let email_config = EmailConfig::from_env().context("Failed to load email configuration")?;
    let email_service =
        EmailServiceFactory::create(email_config).context("Failed to create email service")?;

    let teams_state = TeamsState::new(pool, config, email_service)
        .context("Failed to build teams state")?;

    Ok(create_app_with(teams_state))
}

/// Build the router around an already assembled state.
///
/// Tests use this to inject a mock email service.
pub fn create_app_with(teams_state: TeamsState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { BANNER }))
        .merge(teamtact_teams::routes().with_state(teams_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
