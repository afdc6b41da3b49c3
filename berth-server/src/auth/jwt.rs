//! Access-token generation and validation
//!
//! Login issues an HS256-signed JWT carrying the user's id and username; no
//! session state is kept server-side. The username rides in the claims
//! because it doubles as the user's data-directory name.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's database id
    pub sub: i64,
    /// The user's login name
    pub username: String,
    /// Expiration (UTC Unix timestamp)
    pub exp: i64,
    /// Issued-at (UTC Unix timestamp)
    pub iat: i64,
    /// Unique token id
    pub jti: String,
}

/// Generates an access token for the given user
pub fn generate_token(
    user_id: i64,
    username: &str,
    secret: &str,
    expiry_mins: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (now + chrono::Duration::minutes(expiry_mins)).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates a token's signature and expiry, returning its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}
