//! Auth Service
//!
//! Registration and login logic.

use berth_core::domain::user::{User, validate_username};
use sqlx::SqlitePool;

use crate::auth::{jwt, password};
use crate::repository::user_repository;
use crate::userdirs::UserDirs;

/// Service error type
#[derive(Debug)]
pub enum AuthError {
    ValidationError(String),
    UsernameTaken(String),
    InvalidCredentials,
    HashError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err)
    }
}

/// Register a new user and create their data directory
pub async fn register(
    pool: &SqlitePool,
    dirs: &UserDirs,
    min_password_len: usize,
    username: &str,
    plaintext: &str,
) -> Result<User, AuthError> {
    validate_username(username).map_err(AuthError::ValidationError)?;

    if plaintext.len() < min_password_len {
        return Err(AuthError::ValidationError(format!(
            "password must be at least {} characters",
            min_password_len
        )));
    }

    if user_repository::find_by_username(pool, username)
        .await?
        .is_some()
    {
        return Err(AuthError::UsernameTaken(username.to_string()));
    }

    let hash =
        password::hash_password(plaintext).map_err(|e| AuthError::HashError(e.to_string()))?;

    let user = user_repository::create(pool, username, &hash).await?;

    // The user's data directory is created eagerly so later operations can
    // assume it exists
    if let Err(e) = dirs.ensure_user_root(username) {
        tracing::error!("Failed to create data directory for {}: {}", username, e);
    }

    tracing::info!("User registered: {} (id {})", user.username, user.id);

    Ok(user)
}

/// Verify credentials and issue an access token
pub async fn login(
    pool: &SqlitePool,
    jwt_secret: &str,
    token_expiry_mins: i64,
    username: &str,
    plaintext: &str,
) -> Result<String, AuthError> {
    let user = user_repository::find_by_username(pool, username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let verified = password::verify_password(plaintext, &user.password_hash)
        .map_err(|e| AuthError::HashError(e.to_string()))?;

    if !verified {
        return Err(AuthError::InvalidCredentials);
    }

    let token = jwt::generate_token(user.id, &user.username, jwt_secret, token_expiry_mins)
        .map_err(|e| AuthError::HashError(e.to_string()))?;

    tracing::info!("User logged in: {}", user.username);

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let dirs = UserDirs::new(tmp.path().to_path_buf());

        let user = register(&pool, &dirs, 8, "alice", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert!(tmp.path().join("alice").is_dir());

        let token = login(&pool, "secret", 60, "alice", "hunter2hunter2")
            .await
            .unwrap();
        let claims = crate::auth::jwt::validate_token(&token, "secret").unwrap();
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_and_bad_username() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let dirs = UserDirs::new(tmp.path().to_path_buf());

        assert!(matches!(
            register(&pool, &dirs, 8, "alice", "short").await,
            Err(AuthError::ValidationError(_))
        ));
        assert!(matches!(
            register(&pool, &dirs, 8, "../etc", "longenoughpw").await,
            Err(AuthError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let dirs = UserDirs::new(tmp.path().to_path_buf());

        register(&pool, &dirs, 8, "alice", "hunter2hunter2")
            .await
            .unwrap();
        assert!(matches!(
            register(&pool, &dirs, 8, "alice", "hunter2hunter2").await,
            Err(AuthError::UsernameTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_user() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let dirs = UserDirs::new(tmp.path().to_path_buf());

        register(&pool, &dirs, 8, "alice", "hunter2hunter2")
            .await
            .unwrap();

        assert!(matches!(
            login(&pool, "secret", 60, "alice", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&pool, "secret", 60, "mallory", "whatever-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
