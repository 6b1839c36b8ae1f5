//! Validation helpers and constants for API handlers

use regex::Regex;

lazy_static::lazy_static! {
    /// Team join code: exactly six uppercase letters or digits
    pub static ref TEAM_CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9]{6}$").unwrap();

    /// Usernames: 3 to 30 lowercase letters, digits, dots, underscores or hyphens,
    /// starting with a letter or digit
    pub static ref USERNAME_REGEX: Regex =
        Regex::new(r"^[a-z0-9][a-z0-9._-]{2,29}$").unwrap();
}

/// Validate a team join code
pub fn validate_team_code(code: &str) -> bool {
    TEAM_CODE_REGEX.is_match(code)
}

/// Validate a username after lowercasing
pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// Canonical form of an email address for storage and comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
