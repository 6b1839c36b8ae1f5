//! Invitation repository

use crate::domain::entities::Invitation;
use crate::repository::ListFilter;
use sqlx::PgPool;
use teamtact_common::{Error, PageQuery, RepositoryError, Result};
use uuid::Uuid;

const INVITATION_COLUMNS: &str = "i.id, i.team_id, i.email, i.role, i.invited_by, i.token, \
                                  i.invited_at, i.expiration_date, i.is_cancelled, \
                                  i.is_accepted, i.accepted_at";

/// Invitation joined with the inviting user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvitationWithInviter {
    #[sqlx(flatten)]
    pub invitation: Invitation,
    pub inviter_fullname: String,
    pub inviter_username: String,
    pub inviter_email: String,
}

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find invitation by ID
    pub async fn get_by_id(&self, invitation_id: Uuid) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations i WHERE i.id = $1"
        ))
        .bind(invitation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find invitation by its emailed token
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations i WHERE i.token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// The invitation still occupying the (team, email) slot, if any: neither
    /// accepted nor cancelled. It may be past due.
    pub async fn find_outstanding(&self, team_id: Uuid, email: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations i
            WHERE i.team_id = $1
              AND LOWER(i.email) = LOWER($2)
              AND NOT i.is_accepted
              AND NOT i.is_cancelled
            "#
        ))
        .bind(team_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Cancel a pending invitation (admin-initiated).
    ///
    /// Conditional on the row still being outstanding, so cancelling twice or
    /// racing an accept fails cleanly.
    pub async fn cancel(&self, invitation_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET is_cancelled = TRUE
            WHERE id = $1 AND NOT is_accepted AND NOT is_cancelled
            "#,
        )
        .bind(invitation_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::AlreadyProcessed(
                "Invitation has already been processed".to_string(),
            ));
        }
        Ok(())
    }

    /// Mark every past-due pending invitation cancelled. Returns the count.
    pub async fn cancel_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET is_cancelled = TRUE
            WHERE NOT is_accepted AND NOT is_cancelled AND expiration_date <= NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Hard-delete an invitation
    pub async fn delete(&self, invitation_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(invitation_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(())
    }

    /// One page of a team's invitations, newest first, with the inviter.
    ///
    /// Returns the page and the total number of matching rows.
    pub async fn list_by_team(
        &self,
        team_id: Uuid,
        filter: &ListFilter,
        page: &PageQuery,
    ) -> Result<(Vec<InvitationWithInviter>, i64)> {
        let pattern = filter.search_pattern();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM invitations i
            WHERE i.team_id = $1
              AND ($2::text IS NULL OR i.email ILIKE $2)
              AND ($3::teammate_role IS NULL OR i.role = $3)
            "#,
        )
        .bind(team_id)
        .bind(&pattern)
        .bind(filter.role)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, InvitationWithInviter>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS},
                   u.fullname AS inviter_fullname,
                   u.username AS inviter_username,
                   u.email AS inviter_email
            FROM invitations i
            INNER JOIN users u ON i.invited_by = u.id
            WHERE i.team_id = $1
              AND ($2::text IS NULL OR i.email ILIKE $2)
              AND ($3::teammate_role IS NULL OR i.role = $3)
            ORDER BY i.invited_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(team_id)
        .bind(&pattern)
        .bind(filter.role)
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
