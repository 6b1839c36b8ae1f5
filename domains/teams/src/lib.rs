//! Teams domain: users, single-use tokens, teams, memberships, invitations

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationState, InvitationStateMachine, StateError,
};
// Re-export repository types
pub use repository::{
    cancel_invitation_tx, create_invitation_tx, create_membership_tx, create_team_tx,
    mark_invitation_accepted_tx, InvitationRepository, InvitationWithInviter, ListFilter,
    MembershipRepository, MembershipWithUser, TeamRepository, TeamWithRole, TeamsRepositories,
    TokenRepository, UserRepository,
};

// Re-export API types
pub use api::middleware::TeamsSettings;
pub use api::routes;
pub use api::TeamsState;

// Re-export auth types used alongside the teams API
pub use teamtact_auth::{ActiveUser, AuthBackend, AuthConfig, AuthContext, AuthUser};
