//! Single-use token repository
//!
//! Password-reset and email-verification codes. The plaintext code is handed
//! out once; rows hold only its SHA-256 digest.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use teamtact_common::{generate_token_code, hash_token_code, Error, Result};
use uuid::Uuid;

use crate::domain::entities::{SingleUseToken, TokenPurpose};

#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh code for `(user, purpose)`, replacing any earlier one.
    pub async fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String> {
        let code = generate_token_code()?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND purpose = $2")
            .bind(user_id)
            .bind(purpose)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO tokens (id, user_id, code_hash, purpose, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(hash_token_code(&code))
        .bind(purpose)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, purpose = %purpose, "Issued single-use token");
        Ok(code)
    }

    /// Redeem a code. Succeeds at most once per issued code.
    ///
    /// An expired row is deleted before the `Expired` error is returned; an
    /// unknown code leaves the table untouched.
    pub async fn consume(&self, code: &str, purpose: TokenPurpose, ttl: Duration) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let token = sqlx::query_as::<_, SingleUseToken>(
            r#"
            SELECT id, user_id, code_hash, purpose, created_at
            FROM tokens
            WHERE code_hash = $1 AND purpose = $2
            FOR UPDATE
            "#,
        )
        .bind(hash_token_code(code))
        .bind(purpose)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found(purpose))?;

        let deleted = sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(token.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if token.is_expired_at(ttl, Utc::now()) {
            tx.commit().await?;
            return Err(expired(purpose));
        }

        if deleted == 0 {
            return Err(not_found(purpose));
        }

        tx.commit().await?;
        Ok(token.user_id)
    }

    /// Check a code without redeeming it. Expired rows are still removed.
    pub async fn peek(&self, code: &str, purpose: TokenPurpose, ttl: Duration) -> Result<Uuid> {
        let token = sqlx::query_as::<_, SingleUseToken>(
            r#"
            SELECT id, user_id, code_hash, purpose, created_at
            FROM tokens
            WHERE code_hash = $1 AND purpose = $2
            "#,
        )
        .bind(hash_token_code(code))
        .bind(purpose)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(purpose))?;

        if token.is_expired_at(ttl, Utc::now()) {
            sqlx::query("DELETE FROM tokens WHERE id = $1")
                .bind(token.id)
                .execute(&self.pool)
                .await?;
            return Err(expired(purpose));
        }

        Ok(token.user_id)
    }
}

fn not_found(purpose: TokenPurpose) -> Error {
    Error::NotFound(format!("{} token not found", purpose.label()))
}

fn expired(purpose: TokenPurpose) -> Error {
    Error::Expired(format!("{} token has expired", purpose.label()))
}
