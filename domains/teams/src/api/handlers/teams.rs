//! Team management API handlers
//!
//! Team creation with join codes, listing, detail and deletion. Creating a
//! team enrolls the creator as OWNER in the same transaction.

use crate::{
    create_membership_tx, create_team_tx, Membership, MembershipRole, Team, TeamWithRole,
    MAX_TEAM_CODE_ATTEMPTS,
};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use teamtact_auth::AuthUser;
use teamtact_common::{ApiResponse, Error, RepositoryError, Result, ValidatedJson};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamsState;

/// Request for creating a new team
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Optional join code; generated when absent
    #[validate(custom(function = "validate_code_format", message = "Invalid team code format"))]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateCodeRequest {
    #[validate(custom(function = "validate_code_format", message = "Invalid team code format"))]
    pub code: String,
}

/// Custom validation function for team code format
fn validate_code_format(code: &str) -> std::result::Result<(), validator::ValidationError> {
    Team::validate_code(code).map_err(|_| validator::ValidationError::new("invalid_format"))
}

#[derive(Debug, Serialize)]
pub struct TeamCodeResponse {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CodeAvailability {
    pub code: String,
    pub available: bool,
}

/// Team detail for members
#[derive(Debug, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub role: MembershipRole,
    pub members_count: i64,
}

/// Draw random codes until one is unused
async fn generate_unique_code(state: &TeamsState) -> Result<String> {
    for _ in 0..MAX_TEAM_CODE_ATTEMPTS {
        let code = Team::generate_code();
        if !state.repos.teams.code_exists(&code).await? {
            return Ok(code);
        }
    }
    Err(Error::Internal(
        "Could not generate a unique team code".to_string(),
    ))
}

/// Create a new team
///
/// **POST /teams**
///
/// The creator becomes the OWNER member atomically with the team insert.
pub async fn create_team(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<CreateTeamRequest>,
) -> Result<ApiResponse<Team>> {
    let owner_id = auth.user_id;

    if state
        .repos
        .teams
        .name_exists_for_owner(owner_id, &request.name)
        .await?
    {
        return Err(Error::Conflict("Team name already exists".to_string()));
    }

    let code = match request.code {
        Some(code) => {
            if state.repos.teams.code_exists(&code).await? {
                return Err(Error::Conflict("Team code already exists".to_string()));
            }
            code
        }
        None => generate_unique_code(&state).await?,
    };

    let team = Team::new(request.name, code, owner_id)?;

    let mut tx = state.repos.begin().await?;

    let created_team = create_team_tx(&mut tx, &team).await.map_err(|e| match e {
        RepositoryError::AlreadyExists => {
            Error::Conflict("Team name or code already exists".to_string())
        }
        other => other.into(),
    })?;

    let owner = Membership::new(created_team.id, owner_id, MembershipRole::Owner);
    create_membership_tx(&mut tx, &owner).await?;

    tx.commit().await?;

    tracing::info!(team_id = %created_team.id, user_id = %owner_id, "Team created");

    Ok(ApiResponse::created("Team created", created_team))
}

/// List teams for the current user
///
/// **GET /teams**
pub async fn list_teams(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
) -> Result<ApiResponse<Vec<TeamWithRole>>> {
    let teams = state.repos.teams.list_by_user(auth.user_id).await?;
    Ok(ApiResponse::ok("Teams retrieved successfully", teams))
}

/// **GET /teams/autogenerate-code**
pub async fn autogenerate_code(
    AuthUser(_auth): AuthUser,
    State(state): State<TeamsState>,
) -> Result<ApiResponse<TeamCodeResponse>> {
    let code = generate_unique_code(&state).await?;
    Ok(ApiResponse::ok(
        "Team code generated",
        TeamCodeResponse { code },
    ))
}

/// **POST /teams/validate-code**
pub async fn validate_code(
    AuthUser(_auth): AuthUser,
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<ValidateCodeRequest>,
) -> Result<ApiResponse<CodeAvailability>> {
    let available = !state.repos.teams.code_exists(&request.code).await?;
    let message = if available {
        "Team code is available"
    } else {
        "Team code is already taken"
    };

    Ok(ApiResponse::ok(
        message,
        CodeAvailability {
            code: request.code,
            available,
        },
    ))
}

/// Get team details
///
/// **GET /teams/{id}**
pub async fn get_team(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<Uuid>,
) -> Result<ApiResponse<TeamDetail>> {
    let membership = state.require_membership(team_id, auth.user_id).await?;

    let team = state
        .repos
        .teams
        .get_by_id(team_id)
        .await?
        .ok_or_else(|| Error::NotFound("Team not found".to_string()))?;
    let members_count = state.repos.memberships.count_by_team(team_id).await?;

    Ok(ApiResponse::ok(
        "Team retrieved successfully",
        TeamDetail {
            team,
            role: membership.role,
            members_count,
        },
    ))
}

/// Delete a team
///
/// **DELETE /teams/{id}**
///
/// Owner only. Members and invitations go with it.
pub async fn delete_team(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<Uuid>,
) -> Result<ApiResponse<()>> {
    let membership = state.require_membership(team_id, auth.user_id).await?;

    if !membership.role.is_owner() {
        return Err(Error::Authorization(
            "Only the team owner can delete the team".to_string(),
        ));
    }

    state.repos.teams.delete(team_id).await?;

    tracing::info!(team_id = %team_id, user_id = %auth.user_id, "Team deleted");

    Ok(ApiResponse::message("Team deleted successfully"))
}
