//! Domain entities for the TeamTact teams domain
//!
//! Users, single-use tokens, teams, team members and invitations.
//! Each entity carries its own validation and business rules.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use teamtact_common::{generate_token_code, Config, Error, Result};
use validator::ValidateEmail;

pub use crate::domain::state::InvitationState;
use crate::domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationStateMachine, StateError,
};
use crate::domain::validation::{normalize_email, validate_team_code, validate_username};

/// Alphabet for team join codes
const TEAM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const TEAM_CODE_LENGTH: usize = 6;

/// Upper bound on attempts to find an unused team code
pub const MAX_TEAM_CODE_ATTEMPTS: usize = 10_000;

// ============================================================================
// User
// ============================================================================

/// User account
#[derive(Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("fullname", &self.fullname)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("email_verified", &self.email_verified)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// New, unverified, active account. Email and username are stored lowercase.
    pub fn new(
        fullname: String,
        email: String,
        username: String,
        password_hash: String,
    ) -> Result<Self> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            fullname: fullname.trim().to_string(),
            email: normalize_email(&email),
            username: username.trim().to_lowercase(),
            password_hash,
            is_active: true,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fullname.is_empty() || self.fullname.len() > 100 {
            return Err(Error::Validation(
                "Full name must be 1-100 characters".to_string(),
            ));
        }

        if !self.email.validate_email() || self.email.len() > 255 {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        if !validate_username(&self.username) {
            return Err(Error::Validation(
                "Username must be 3-30 characters of letters, digits, '.', '_' or '-'"
                    .to_string(),
            ));
        }

        if self.password_hash.is_empty() {
            return Err(Error::Validation("Password hash is required".to_string()));
        }

        Ok(())
    }

    /// Sign-in gate applied after the password check
    pub fn check_can_login(&self) -> Result<()> {
        if !self.email_verified {
            return Err(Error::Authorization(
                "Email Verification is pending, please verify and try again!".to_string(),
            ));
        }
        if !self.is_active {
            return Err(Error::Authorization("Your account is inactive".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Single-use tokens
// ============================================================================

/// What a single-use token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    ResetPassword,
    EmailVerification,
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPurpose::ResetPassword => write!(f, "reset_password"),
            TokenPurpose::EmailVerification => write!(f, "email_verification"),
        }
    }
}

impl TokenPurpose {
    /// Human label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            TokenPurpose::ResetPassword => "Password reset",
            TokenPurpose::EmailVerification => "Email verification",
        }
    }
}

/// Lifetimes of single-use tokens per purpose
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    pub reset_password: Duration,
    pub email_verification: Duration,
}

impl TokenTtls {
    pub fn ttl(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::ResetPassword => self.reset_password,
            TokenPurpose::EmailVerification => self.email_verification,
        }
    }
}

impl From<&Config> for TokenTtls {
    fn from(config: &Config) -> Self {
        Self {
            reset_password: Duration::minutes(config.reset_token_ttl_minutes),
            email_verification: Duration::hours(config.verification_token_ttl_hours),
        }
    }
}

/// Persisted single-use token. Only the digest of the code is stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SingleUseToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub purpose: TokenPurpose,
    pub created_at: DateTime<Utc>,
}

impl SingleUseToken {
    /// Expired once `created_at + ttl` has passed
    pub fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.created_at + ttl <= now
    }
}

// ============================================================================
// Team
// ============================================================================

/// Team entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team with validation. Code uniqueness is the caller's concern.
    pub fn new(name: String, code: String, owner_id: Uuid) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() || name.len() > 100 {
            return Err(Error::Validation(
                "Team name must be 1-100 characters".to_string(),
            ));
        }

        Self::validate_code(&code)?;

        let now = Utc::now();
        Ok(Team {
            id: Uuid::new_v4(),
            name,
            code,
            owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Six uppercase letters or digits
    pub fn validate_code(code: &str) -> Result<()> {
        if !validate_team_code(code) {
            return Err(Error::Validation(
                "Team code must be 6 uppercase letters or digits".to_string(),
            ));
        }
        Ok(())
    }

    /// Random candidate code
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..TEAM_CODE_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..TEAM_CODE_ALPHABET.len());
                TEAM_CODE_ALPHABET[idx] as char
            })
            .collect()
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Role of a team member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "teammate_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipRole {
    Owner,
    Admin,
    Viewer,
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipRole::Owner => write!(f, "OWNER"),
            MembershipRole::Admin => write!(f, "ADMIN"),
            MembershipRole::Viewer => write!(f, "VIEWER"),
        }
    }
}

impl std::str::FromStr for MembershipRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Ok(MembershipRole::Owner),
            "ADMIN" => Ok(MembershipRole::Admin),
            "VIEWER" => Ok(MembershipRole::Viewer),
            other => Err(Error::Validation(format!("Unknown role: {}", other))),
        }
    }
}

impl MembershipRole {
    pub const ALL: [MembershipRole; 3] = [
        MembershipRole::Owner,
        MembershipRole::Admin,
        MembershipRole::Viewer,
    ];

    /// Check if this role can manage invitations
    pub fn can_admin(&self) -> bool {
        matches!(self, MembershipRole::Owner | MembershipRole::Admin)
    }

    /// Check if this role is owner
    pub fn is_owner(&self) -> bool {
        matches!(self, MembershipRole::Owner)
    }
}

/// Role an invitation may offer. OWNER is granted only at team creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "teammate_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationRole {
    Admin,
    Viewer,
}

impl InvitationRole {
    /// Convert to the corresponding membership role
    pub fn to_membership_role(&self) -> MembershipRole {
        match self {
            InvitationRole::Admin => MembershipRole::Admin,
            InvitationRole::Viewer => MembershipRole::Viewer,
        }
    }
}

impl TryFrom<MembershipRole> for InvitationRole {
    type Error = Error;

    fn try_from(role: MembershipRole) -> Result<Self> {
        match role {
            MembershipRole::Admin => Ok(InvitationRole::Admin),
            MembershipRole::Viewer => Ok(InvitationRole::Viewer),
            MembershipRole::Owner => Err(Error::Validation(
                "Owner is created with the team and cannot be invited".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for InvitationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_membership_role().fmt(f)
    }
}

// ============================================================================
// Membership
// ============================================================================

/// Membership entity: association between User and Team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(team_id: Uuid, user_id: Uuid, role: MembershipRole) -> Self {
        Membership {
            id: Uuid::new_v4(),
            team_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}

// ============================================================================
// Invitation
// ============================================================================

/// Invitation to join a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub team_id: Uuid,
    pub email: String,
    pub role: InvitationRole,
    pub invited_by: Uuid,
    #[serde(skip_serializing, default)]
    pub token: String,
    pub invited_at: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub is_cancelled: bool,
    pub is_accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Create a new invitation with validation
    pub fn new(
        team_id: Uuid,
        invited_by: Uuid,
        email: &str,
        role: InvitationRole,
        expires_in: Duration,
    ) -> Result<Self> {
        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        let now = Utc::now();
        Ok(Invitation {
            id: Uuid::new_v4(),
            team_id,
            email,
            role,
            invited_by,
            token: generate_token_code()?,
            invited_at: now,
            expiration_date: now + expires_in,
            is_cancelled: false,
            is_accepted: false,
            accepted_at: None,
        })
    }

    /// Derived state; accepted and cancelled take precedence over the clock
    #[mutants::skip] // Delegates to state_at() with the current time
    pub fn state(&self) -> InvitationState {
        self.state_at(Utc::now())
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> InvitationState {
        if self.is_accepted {
            InvitationState::Accepted
        } else if self.is_cancelled {
            InvitationState::Cancelled
        } else if self.expiration_date <= now {
            InvitationState::Expired
        } else {
            InvitationState::Pending
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expiration_date <= Utc::now()
    }

    /// Accept the invitation
    pub fn accept(&mut self) -> Result<()> {
        self.apply_transition(InvitationEvent::Accept)?;
        self.is_accepted = true;
        self.accepted_at = Some(Utc::now());
        Ok(())
    }

    /// Cancel a pending invitation
    pub fn cancel(&mut self) -> Result<()> {
        self.apply_transition(InvitationEvent::Cancel)?;
        self.is_cancelled = true;
        Ok(())
    }

    /// Retire a past-due invitation. Stored as a cancellation, which frees the
    /// (team, email) slot for a fresh invitation.
    pub fn expire(&mut self) -> Result<()> {
        if !self.is_expired() {
            return Err(Error::Validation(
                "Invitation has not expired yet".to_string(),
            ));
        }
        // The clock already reports Expired; the flags decide whether the row
        // is still outstanding.
        let stored = if self.is_accepted {
            InvitationState::Accepted
        } else if self.is_cancelled {
            InvitationState::Cancelled
        } else {
            InvitationState::Pending
        };
        self.run_machine(stored, InvitationEvent::Expire)?;
        self.is_cancelled = true;
        Ok(())
    }

    fn apply_transition(&self, event: InvitationEvent) -> Result<InvitationState> {
        self.run_machine(self.state(), event)
    }

    /// Run the transition through the state machine, mapping failures onto
    /// the API error taxonomy
    fn run_machine(
        &self,
        current: InvitationState,
        event: InvitationEvent,
    ) -> Result<InvitationState> {
        let context = InvitationGuardContext {
            is_expired: self.is_expired(),
        };

        InvitationStateMachine::transition(current, event, Some(&context)).map_err(|e| {
            match e {
                StateError::TerminalState(state) => match state.as_str() {
                    "accepted" => {
                        Error::AlreadyProcessed("Invitation already accepted".to_string())
                    }
                    "cancelled" => {
                        Error::AlreadyProcessed("Invitation has been cancelled".to_string())
                    }
                    _ => Error::Expired("Invitation Expired".to_string()),
                },
                StateError::GuardFailed(_) => Error::Expired("Invitation Expired".to_string()),
                StateError::InvalidTransition { from, event } => Error::Validation(format!(
                    "Invalid invitation transition: cannot apply '{}' event from '{}' state",
                    event, from
                )),
            }
        })
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if !self.email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        if self.is_accepted && self.is_cancelled {
            return Err(Error::Validation(
                "Invitation cannot be both accepted and cancelled".to_string(),
            ));
        }

        if self.is_accepted != self.accepted_at.is_some() {
            return Err(Error::Validation(
                "accepted_at must be set exactly when the invitation is accepted".to_string(),
            ));
        }

        if self.invited_at >= self.expiration_date {
            return Err(Error::Validation(
                "Expiration must be after creation".to_string(),
            ));
        }

        Ok(())
    }
}
