//! Transactional free functions for Teams domain (Zero2Prod pattern)

use crate::domain::entities::{Invitation, Membership, Team};
use sqlx::{Postgres, Transaction};
use teamtact_common::RepositoryError;
use uuid::Uuid;

/// Insert a team within an existing transaction.
///
/// A taken code or a duplicate `(owner, lower(name))` returns
/// `RepositoryError::AlreadyExists`.
pub async fn create_team_tx(
    transaction: &mut Transaction<'_, Postgres>,
    team: &Team,
) -> std::result::Result<Team, RepositoryError> {
    let created = sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (id, name, code, owner_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, code, owner_id, created_at, updated_at
        "#,
    )
    .bind(team.id)
    .bind(&team.name)
    .bind(&team.code)
    .bind(team.owner_id)
    .bind(team.created_at)
    .bind(team.updated_at)
    .fetch_one(&mut **transaction)
    .await?;
    Ok(created)
}

/// Create a membership within an existing transaction.
pub async fn create_membership_tx(
    transaction: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> std::result::Result<Membership, RepositoryError> {
    let created = sqlx::query_as::<_, Membership>(
        r#"
        INSERT INTO team_mates (id, team_id, user_id, role, joined_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, team_id, user_id, role, joined_at
        "#,
    )
    .bind(membership.id)
    .bind(membership.team_id)
    .bind(membership.user_id)
    .bind(membership.role)
    .bind(membership.joined_at)
    .fetch_one(&mut **transaction)
    .await?;
    Ok(created)
}

/// Insert an invitation within an existing transaction.
///
/// The partial unique index on outstanding invitations turns a concurrent
/// duplicate into `RepositoryError::AlreadyExists`.
pub async fn create_invitation_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invitation: &Invitation,
) -> std::result::Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO invitations (id, team_id, email, role, invited_by, token, invited_at,
                                 expiration_date, is_cancelled, is_accepted, accepted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(invitation.id)
    .bind(invitation.team_id)
    .bind(&invitation.email)
    .bind(invitation.role)
    .bind(invitation.invited_by)
    .bind(&invitation.token)
    .bind(invitation.invited_at)
    .bind(invitation.expiration_date)
    .bind(invitation.is_cancelled)
    .bind(invitation.is_accepted)
    .bind(invitation.accepted_at)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

/// Cancel an outstanding invitation within an existing transaction.
///
/// Returns `RepositoryError::NotFound` if it was already accepted or cancelled.
pub async fn cancel_invitation_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET is_cancelled = TRUE
        WHERE id = $1 AND NOT is_accepted AND NOT is_cancelled
        "#,
    )
    .bind(invitation_id)
    .execute(&mut **transaction)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Mark an invitation as accepted within an existing transaction.
///
/// Returns `RepositoryError::NotFound` unless the invitation is still
/// pending and unexpired at the moment of the write; the first of two
/// concurrent accepts wins.
pub async fn mark_invitation_accepted_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET is_accepted = TRUE, accepted_at = NOW()
        WHERE id = $1
          AND NOT is_accepted
          AND NOT is_cancelled
          AND expiration_date > NOW()
        "#,
    )
    .bind(invitation_id)
    .execute(&mut **transaction)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
