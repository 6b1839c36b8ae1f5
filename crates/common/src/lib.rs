//! Shared utilities, configuration, and error handling for TeamTact
//!
//! This crate provides common functionality used across the TeamTact backend:
//! - Configuration loaded once from the environment
//! - Error taxonomy and the JSON response envelope
//! - Request extractors and pagination
//! - Password hashing and single-use token codes

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod response;
pub mod state;

pub use config::Config;
pub use crypto::{generate_token_code, hash_password, hash_token_code, verify_password};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{Page, PageQuery, ValidatedJson};
pub use response::ApiResponse;
pub use state::StateError;
