//! Team repository

use crate::domain::entities::{MembershipRole, Team};
use serde::Serialize;
use sqlx::PgPool;
use teamtact_common::{RepositoryError, Result};
use uuid::Uuid;

/// A team together with the caller's role in it
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamWithRole {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub team: Team,
    pub role: MembershipRole,
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find team by ID
    pub async fn get_by_id(&self, team_id: Uuid) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, code, owner_id, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Whether a join code is already taken
    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE code = $1)")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Whether the owner already has a team with this name, ignoring case
    pub async fn name_exists_for_owner(&self, owner_id: Uuid, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM teams
                WHERE owner_id = $1 AND LOWER(name) = LOWER($2)
            )
            "#,
        )
        .bind(owner_id)
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// List teams for user with roles
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<TeamWithRole>> {
        let rows = sqlx::query_as::<_, TeamWithRole>(
            r#"
            SELECT t.id, t.name, t.code, t.owner_id, t.created_at, t.updated_at, m.role
            FROM teams t
            INNER JOIN team_mates m ON t.id = m.team_id
            WHERE m.user_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete a team; members and invitations cascade
    pub async fn delete(&self, team_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(())
    }
}
