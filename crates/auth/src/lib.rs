//! Session boundary for the TeamTact API
//!
//! Issues and verifies access/refresh JWTs, reads and writes the auth
//! cookies, and provides axum extractors that work with any domain state
//! implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
pub mod cookies;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::{AuthBackend, SessionTokens};
pub use claims::{TokenClaims, TokenType};
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{ActiveUser, AuthUser, RefreshSession};
pub use jwt::{issue_access_token, issue_refresh_token, issue_token, verify_token};
pub use types::AuthIdentity;
