//! User Repository
//!
//! Handles all database operations related to users.

use berth_core::domain::user::User;
use sqlx::SqlitePool;

/// Create a new user in the database
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        created_at: now,
    })
}

/// Find a user by username
pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password_hash, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find a user by ID
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password_hash, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let created_at = chrono::DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now());

        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at,
        }
    }
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
    async fn test_create_and_find_by_username() {
        let pool = test_pool().await;

        let user = create(&pool, "alice", "$argon2id$fake").await.unwrap();
        assert!(user.id > 0);

        let found = find_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, "$argon2id$fake");
    }

    #[tokio::test]
    async fn test_find_unknown_username_is_none() {
        let pool = test_pool().await;
        assert!(find_by_username(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let pool = test_pool().await;
        create(&pool, "alice", "h1").await.unwrap();
        assert!(create(&pool, "alice", "h2").await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let pool = test_pool().await;
        let user = create(&pool, "bob", "h").await.unwrap();

        let found = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(found.username, "bob");

        assert!(find_by_id(&pool, user.id + 100).await.unwrap().is_none());
    }
}
