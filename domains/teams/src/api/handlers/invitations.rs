//! Team invitation API handlers
//!
//! Batch invite, listing, accept, cancel and delete. Invitation state is
//! derived from the stored flags and the clock (see `InvitationState`).

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamtact_auth::{ActiveUser, AuthUser};
use teamtact_common::{ApiResponse, Error, Page, RepositoryError, Result, ValidatedJson};
use teamtact_email::dispatch;
use uuid::Uuid;
use validator::Validate;

use crate::api::handlers::{ListQuery, Listing};
use crate::api::middleware::TeamsState;
use crate::domain::validation::normalize_email;
use crate::{
    cancel_invitation_tx, create_invitation_tx, create_membership_tx, mark_invitation_accepted_tx,
    Invitation, InvitationRole, InvitationState, InvitationWithInviter, Membership,
    MembershipRole, Team,
};

/// One entry of a batch invite.
///
/// `role` accepts OWNER so the batch can report it per entry instead of
/// rejecting the whole request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InviteEntry {
    #[validate(email)]
    pub email: String,

    pub role: MembershipRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchInviteRequest {
    #[validate(length(min = 1, max = 50), nested)]
    pub invitations: Vec<InviteEntry>,
}

/// Why an entry of a batch invite was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsentReason {
    OwnerRole,
    AlreadyMember,
    AlreadyInvited,
}

impl UnsentReason {
    /// Machine-checkable code
    pub fn code(&self) -> &'static str {
        match self {
            UnsentReason::OwnerRole => "owner_role",
            UnsentReason::AlreadyMember => "already_member",
            UnsentReason::AlreadyInvited => "already_invited",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UnsentReason::OwnerRole => "Owner is created with the team and cannot be invited",
            UnsentReason::AlreadyMember => "Member already exists",
            UnsentReason::AlreadyInvited => "Member already invited",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsentInvitation {
    pub email: String,
    pub reason: &'static str,
    pub code: &'static str,
}

/// Outcome of a batch invite; entries succeed or fail independently
#[derive(Debug, Default, Serialize)]
pub struct BatchInviteResult {
    pub sent_invitations: Vec<String>,
    pub unsent_invitations: Vec<UnsentInvitation>,
}

impl BatchInviteResult {
    fn reject(&mut self, email: String, reason: UnsentReason) {
        self.unsent_invitations.push(UnsentInvitation {
            email,
            reason: reason.message(),
            code: reason.code(),
        });
    }

    /// Status and message for the envelope
    pub fn outcome(&self) -> (StatusCode, &'static str) {
        match (
            self.sent_invitations.is_empty(),
            self.unsent_invitations.is_empty(),
        ) {
            (false, true) => (StatusCode::OK, "Invitations sent!"),
            (false, false) => (
                StatusCode::BAD_REQUEST,
                "Some invitations couldn't be processed!",
            ),
            (true, _) => (
                StatusCode::BAD_REQUEST,
                "Invitations couldn't be processed!",
            ),
        }
    }
}

/// Inviting user as shown in invitation listings
#[derive(Debug, Serialize)]
pub struct InvitorSummary {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
}

/// Response for invitation operations
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub team_id: Uuid,
    pub email: String,
    pub role: InvitationRole,
    pub state: InvitationState,
    pub invited_at: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub is_cancelled: bool,
    pub is_accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitor: Option<InvitorSummary>,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id,
            team_id: invitation.team_id,
            email: invitation.email.clone(),
            role: invitation.role,
            state: invitation.state(),
            invited_at: invitation.invited_at,
            expiration_date: invitation.expiration_date,
            is_cancelled: invitation.is_cancelled,
            is_accepted: invitation.is_accepted,
            accepted_at: invitation.accepted_at,
            invitor: None,
        }
    }
}

impl From<InvitationWithInviter> for InvitationResponse {
    fn from(row: InvitationWithInviter) -> Self {
        let invitor = InvitorSummary {
            id: row.invitation.invited_by,
            fullname: row.inviter_fullname,
            username: row.inviter_username,
            email: row.inviter_email,
        };
        Self {
            invitor: Some(invitor),
            ..Self::from(row.invitation)
        }
    }
}

/// Process one batch entry. `Ok(Some(reason))` rejects the entry only.
async fn invite_one(
    state: &TeamsState,
    team: &Team,
    inviter_id: Uuid,
    email: &str,
    role: MembershipRole,
) -> Result<std::result::Result<Invitation, UnsentReason>> {
    let Ok(role) = InvitationRole::try_from(role) else {
        return Ok(Err(UnsentReason::OwnerRole));
    };

    if state
        .repos
        .memberships
        .is_member_by_email(team.id, email)
        .await?
    {
        return Ok(Err(UnsentReason::AlreadyMember));
    }

    // A past-due invitation that the sweeper has not reached yet still holds
    // the (team, email) slot; retire it and issue a fresh one.
    let stale = match state
        .repos
        .invitations
        .find_outstanding(team.id, email)
        .await?
    {
        Some(existing) if !existing.is_expired() => return Ok(Err(UnsentReason::AlreadyInvited)),
        Some(mut existing) => {
            existing.expire()?;
            Some(existing)
        }
        None => None,
    };

    let invitation = Invitation::new(
        team.id,
        inviter_id,
        email,
        role,
        state.settings.invitation_ttl,
    )?;

    let mut tx = state.repos.begin().await?;

    if let Some(stale) = &stale {
        match cancel_invitation_tx(&mut tx, stale.id).await {
            // Already retired concurrently
            Ok(()) | Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
    }

    match create_invitation_tx(&mut tx, &invitation).await {
        Ok(()) => {}
        Err(RepositoryError::AlreadyExists) => return Ok(Err(UnsentReason::AlreadyInvited)),
        Err(e) => return Err(e.into()),
    }

    tx.commit().await?;

    Ok(Ok(invitation))
}

/// Invite people to a team
///
/// **POST /team-invitations/{team_id}** (also **POST /teams/{id}/invite**)
///
/// Each entry is processed on its own: the response lists what was sent and
/// why the rest was not. Owners and admins only.
pub async fn invite_members(
    ActiveUser(inviter): ActiveUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<BatchInviteRequest>,
) -> Result<ApiResponse<BatchInviteResult>> {
    state.require_admin(team_id, inviter.id).await?;

    let team = state
        .repos
        .teams
        .get_by_id(team_id)
        .await?
        .ok_or_else(|| Error::NotFound("Team not found".to_string()))?;

    let mut result = BatchInviteResult::default();
    let mut seen = HashSet::new();

    for entry in request.invitations {
        let email = normalize_email(&entry.email);

        if !seen.insert(email.clone()) {
            result.reject(email, UnsentReason::AlreadyInvited);
            continue;
        }

        match invite_one(&state, &team, inviter.id, &email, entry.role).await? {
            Ok(invitation) => {
                let email_service = state.email.clone();
                let team_name = team.name.clone();
                let inviter_name = inviter.fullname.clone();
                let days = state.settings.invitation_ttl.num_days();
                dispatch("team_invitation", async move {
                    email_service
                        .send_team_invitation(
                            &invitation.email,
                            &team_name,
                            &inviter_name,
                            &invitation.role.to_string(),
                            &invitation.token,
                            days,
                        )
                        .await
                });
                result.sent_invitations.push(email);
            }
            Err(reason) => result.reject(email, reason),
        }
    }

    tracing::info!(
        team_id = %team_id,
        user_id = %inviter.id,
        sent = result.sent_invitations.len(),
        unsent = result.unsent_invitations.len(),
        "Processed batch invite"
    );

    let (status, message) = result.outcome();
    Ok(ApiResponse::with_status(status, message, Some(result)))
}

/// List a team's invitations
///
/// **GET /team-invitations/{team_id}**
pub async fn list_invitations(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<Listing<InvitationResponse>>> {
    state.require_membership(team_id, auth.user_id).await?;

    let (filter, page) = query.into_parts()?;
    let (rows, total) = state
        .repos
        .invitations
        .list_by_team(team_id, &filter, &page)
        .await?;

    let items = rows.into_iter().map(InvitationResponse::from).collect();

    Ok(ApiResponse::ok(
        "Team invitations retrieved successfully",
        Listing::new(
            &[MembershipRole::Admin, MembershipRole::Viewer],
            Page::new(&page, total, items),
        ),
    ))
}

/// Accept an invitation
///
/// **POST /team-invitations/accept/{token}**
///
/// The caller's email must match the invitee. The accept flag and the new
/// membership are written in one transaction, and the flag update only
/// succeeds while the invitation is still pending. Concurrent accepts of the
/// same token are decided by that update: the loser gets `AlreadyProcessed`.
/// An existing membership surfaces as the unique violation on `team_mates`.
pub async fn accept_invitation(
    ActiveUser(user): ActiveUser,
    State(state): State<TeamsState>,
    Path(token): Path<String>,
) -> Result<ApiResponse<Membership>> {
    let mut invitation = state
        .repos
        .invitations
        .get_by_token(&token)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    if !invitation.email.eq_ignore_ascii_case(&user.email) {
        return Err(Error::Authorization(
            "The invitation was not intended for you".to_string(),
        ));
    }

    invitation.accept()?;

    let membership = Membership::new(
        invitation.team_id,
        user.id,
        invitation.role.to_membership_role(),
    );

    let mut tx = state.repos.begin().await?;

    mark_invitation_accepted_tx(&mut tx, invitation.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                Error::AlreadyProcessed("Invitation has already been processed".to_string())
            }
            other => other.into(),
        })?;

    let created = create_membership_tx(&mut tx, &membership)
        .await
        .map_err(|e| match e {
            RepositoryError::AlreadyExists => {
                Error::Conflict("You are already a member of this team".to_string())
            }
            other => other.into(),
        })?;

    tx.commit().await?;

    tracing::info!(
        team_id = %invitation.team_id,
        user_id = %user.id,
        invitation_id = %invitation.id,
        "Invitation accepted"
    );

    Ok(ApiResponse::ok("Invitation accepted successfully", created))
}

/// Cancel a pending invitation
///
/// **POST /team-invitations/{id}/cancel**
pub async fn cancel_invitation(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    Path(invitation_id): Path<Uuid>,
) -> Result<ApiResponse<InvitationResponse>> {
    let mut invitation = state
        .repos
        .invitations
        .get_by_id(invitation_id)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    state
        .require_admin(invitation.team_id, auth.user_id)
        .await?;

    invitation.cancel()?;
    state.repos.invitations.cancel(invitation_id).await?;

    tracing::info!(invitation_id = %invitation_id, user_id = %auth.user_id, "Invitation cancelled");

    Ok(ApiResponse::ok(
        "Invitation cancelled successfully",
        InvitationResponse::from(invitation),
    ))
}

/// Delete an invitation
///
/// **DELETE /team-invitations/{id}**
pub async fn delete_invitation(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    Path(invitation_id): Path<Uuid>,
) -> Result<ApiResponse<()>> {
    let invitation = state
        .repos
        .invitations
        .get_by_id(invitation_id)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    state
        .require_admin(invitation.team_id, auth.user_id)
        .await?;

    state.repos.invitations.delete(invitation_id).await?;

    tracing::info!(invitation_id = %invitation_id, user_id = %auth.user_id, "Invitation deleted");

    Ok(ApiResponse::message("Invitation deleted successfully!"))
}
