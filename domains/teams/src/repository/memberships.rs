//! Membership repository

use crate::domain::entities::{Membership, MembershipRole};
use crate::repository::ListFilter;
use serde::Serialize;
use sqlx::PgPool;
use teamtact_common::{PageQuery, Result};
use uuid::Uuid;

/// Membership with joined user details for list responses
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MembershipWithUser {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub fullname: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get membership by team and user
    pub async fn get_by_team_and_user(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>> {
        let row = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, team_id, user_id, role, joined_at
            FROM team_mates
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Whether the account registered under `email` already belongs to the team
    pub async fn is_member_by_email(&self, team_id: Uuid, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM team_mates m
                INNER JOIN users u ON m.user_id = u.id
                WHERE m.team_id = $1 AND u.email = LOWER($2)
            )
            "#,
        )
        .bind(team_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn count_by_team(&self, team_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_mates WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// One page of members with user details, owners first.
    ///
    /// Returns the page and the total number of matching rows.
    pub async fn list_by_team(
        &self,
        team_id: Uuid,
        filter: &ListFilter,
        page: &PageQuery,
    ) -> Result<(Vec<MembershipWithUser>, i64)> {
        let pattern = filter.search_pattern();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM team_mates m
            INNER JOIN users u ON m.user_id = u.id
            WHERE m.team_id = $1
              AND ($2::text IS NULL
                   OR u.fullname ILIKE $2 OR u.username ILIKE $2 OR u.email ILIKE $2)
              AND ($3::teammate_role IS NULL OR m.role = $3)
            "#,
        )
        .bind(team_id)
        .bind(&pattern)
        .bind(filter.role)
        .fetch_one(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, MembershipWithUser>(
            r#"
            SELECT m.id, m.team_id, m.user_id, m.role, m.joined_at,
                   u.fullname, u.username, u.email
            FROM team_mates m
            INNER JOIN users u ON m.user_id = u.id
            WHERE m.team_id = $1
              AND ($2::text IS NULL
                   OR u.fullname ILIKE $2 OR u.username ILIKE $2 OR u.email ILIKE $2)
              AND ($3::teammate_role IS NULL OR m.role = $3)
            ORDER BY
                CASE m.role
                    WHEN 'OWNER' THEN 0
                    WHEN 'ADMIN' THEN 1
                    WHEN 'VIEWER' THEN 2
                END ASC,
                u.fullname ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(team_id)
        .bind(&pattern)
        .bind(filter.role)
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((members, total))
    }
}
