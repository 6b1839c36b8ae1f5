//! Repository implementations for Teams domain

pub mod invitations;
pub mod memberships;
pub mod teams;
pub mod tokens;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::entities::MembershipRole;

pub use invitations::{InvitationRepository, InvitationWithInviter};
pub use memberships::{MembershipRepository, MembershipWithUser};
pub use teams::{TeamRepository, TeamWithRole};
pub use tokens::TokenRepository;
pub use transactions::{
    cancel_invitation_tx, create_invitation_tx, create_membership_tx, create_team_tx,
    mark_invitation_accepted_tx,
};
pub use users::UserRepository;

/// Search and role filters shared by the member and invitation listings
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub search: Option<String>,
    pub role: Option<MembershipRole>,
}

impl ListFilter {
    /// `ILIKE` pattern for the search term; blank searches match everything
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            })
    }
}

/// Combined repository access for the Teams domain
#[derive(Clone)]
pub struct TeamsRepositories {
    pool: PgPool,
    pub users: UserRepository,
    pub tokens: TokenRepository,
    pub teams: TeamRepository,
    pub memberships: MembershipRepository,
    pub invitations: InvitationRepository,
}

impl TeamsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool.clone()),
            teams: TeamRepository::new(pool.clone()),
            memberships: MembershipRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
