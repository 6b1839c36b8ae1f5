//! Auth read-model types
//!
//! Lightweight view of the `users` row owned by the teams domain.

use serde::Serialize;
use uuid::Uuid;

/// Identity of the caller, without credentials
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub email_verified: bool,
}
