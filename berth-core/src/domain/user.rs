//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
///
/// The password hash is a PHC-formatted Argon2id string and never leaves the
/// backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database identifier
    pub id: i64,

    /// Unique login name; also names the user's data directory
    pub username: String,

    /// PHC-formatted password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Maximum length of a username.
const MAX_USERNAME_LEN: usize = 32;

/// Minimum length of a username.
const MIN_USERNAME_LEN: usize = 3;

/// Validate a username.
///
/// Usernames double as directory names under the data root, so the accepted
/// alphabet is restricted to characters that are safe in a path component:
/// alphanumeric, hyphen, underscore, or dot.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < MIN_USERNAME_LEN {
        return Err(format!(
            "username must be at least {} characters",
            MIN_USERNAME_LEN
        ));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(format!(
            "username must not exceed {} characters",
            MAX_USERNAME_LEN
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(
            "username may only contain alphanumeric, hyphen, underscore, or dot characters"
                .to_string(),
        );
    }
    // Reject path traversal disguised as a username made of dots
    if username.chars().all(|c| c == '.') {
        return Err("username may not consist only of dots".to_string());
    }
    Ok(())
}
