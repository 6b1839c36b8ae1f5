//! Teams domain state and auth backend integration

use crate::{Membership, TeamsRepositories, TokenTtls};
use axum::extract::FromRef;
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use teamtact_auth::{AuthBackend, AuthConfig};
use teamtact_common::{Config, Error, Result};
use teamtact_email::EmailService;
use uuid::Uuid;

/// Domain settings derived once from `Config`
#[derive(Debug, Clone, Copy)]
pub struct TeamsSettings {
    pub token_ttls: TokenTtls,
    pub invitation_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl From<&Config> for TeamsSettings {
    fn from(config: &Config) -> Self {
        Self {
            token_ttls: TokenTtls::from(config),
            invitation_ttl: Duration::days(config.invitation_expiry_days),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// Application state for the Teams domain
#[derive(Clone)]
pub struct TeamsState {
    pub repos: TeamsRepositories,
    pub auth: AuthBackend,
    pub email: Arc<dyn EmailService>,
    pub settings: TeamsSettings,
}

impl FromRef<TeamsState> for AuthBackend {
    fn from_ref(state: &TeamsState) -> Self {
        state.auth.clone()
    }
}

impl TeamsState {
    pub fn new(pool: PgPool, config: &Config, email: Arc<dyn EmailService>) -> Result<Self> {
        let auth_config = AuthConfig::try_from(config)?;
        Ok(Self {
            repos: TeamsRepositories::new(pool.clone()),
            auth: AuthBackend::new(pool, auth_config),
            email,
            settings: TeamsSettings::from(config),
        })
    }

    /// The caller's membership in an existing team.
    ///
    /// 404 when the team does not exist, 403 when the caller is not a member.
    pub(crate) async fn require_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Membership> {
        if self.repos.teams.get_by_id(team_id).await?.is_none() {
            return Err(Error::NotFound("Team not found".to_string()));
        }

        self.repos
            .memberships
            .get_by_team_and_user(team_id, user_id)
            .await?
            .ok_or_else(|| Error::Authorization("You are not a member of this team".to_string()))
    }

    /// Like `require_membership`, restricted to OWNER and ADMIN
    pub(crate) async fn require_admin(&self, team_id: Uuid, user_id: Uuid) -> Result<Membership> {
        let membership = self.require_membership(team_id, user_id).await?;
        if !membership.role.can_admin() {
            return Err(Error::Authorization(
                "Only team owners and admins can manage invitations".to_string(),
            ));
        }
        Ok(membership)
    }
}
