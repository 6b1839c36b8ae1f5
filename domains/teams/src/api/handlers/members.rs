//! Team member listing

use axum::extract::{Path, Query, State};
use teamtact_auth::AuthUser;
use teamtact_common::{ApiResponse, Page, Result};
use uuid::Uuid;

use crate::api::handlers::{ListQuery, Listing};
use crate::api::middleware::TeamsState;
use crate::{MembershipRole, MembershipWithUser};

/// List team members
///
/// **GET /teams/{id}/members**
///
/// Any member may list. Supports `search` over name, username and email,
/// a `role` filter, and paging.
pub async fn list_members(
    AuthUser(auth): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<Listing<MembershipWithUser>>> {
    state.require_membership(team_id, auth.user_id).await?;

    let (filter, page) = query.into_parts()?;
    let (members, total) = state
        .repos
        .memberships
        .list_by_team(team_id, &filter, &page)
        .await?;

    Ok(ApiResponse::ok(
        "Team members retrieved successfully",
        Listing::new(&MembershipRole::ALL, Page::new(&page, total, members)),
    ))
}
