//! Cryptographic utilities shared across TeamTact crates
//!
//! Passwords are hashed with bcrypt (salt embedded in the hash). Single-use
//! token codes are random, and only their SHA-256 digest is persisted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Bytes of entropy in a single-use token code
const TOKEN_CODE_BYTES: usize = 32;

/// Hash a password with bcrypt at the given cost.
///
/// This is CPU bound; async callers should run it on a blocking thread.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))
}

/// Generate a URL-safe random code for reset, verification and invitation links
pub fn generate_token_code() -> Result<String> {
    let mut bytes = [0u8; TOKEN_CODE_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| Error::Internal(format!("Failed to generate token: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Digest under which a token code is stored
pub fn hash_token_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}
