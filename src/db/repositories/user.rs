//! User repository
//!
//! Authors are looked up by username for the author listing.

use crate::db::{Backend, DynDatabasePool};
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get user by username (exact match)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_user_by_username_sqlite(pool, username).await,
            Backend::Mysql(pool) => get_user_by_username_mysql(pool, username).await,
        }
    }
}

const SELECT_USER: &str =
    "SELECT id, username, display_name, email, date_joined FROM users";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        date_joined: row.try_get("date_joined")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        date_joined: row.try_get("date_joined")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::TestDb;

    #[tokio::test]
    async fn test_get_by_username() {
        let db = TestDb::new().await;
        let id = db.user("jcarbaugh").await;
        let repo = SqlxUserRepository::new(db.pool.clone());

        let user = repo.get_by_username("jcarbaugh").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "jcarbaugh");

        assert!(repo.get_by_username("JCARBAUGH").await.unwrap().is_none());
        assert!(repo.get_by_username("doesnotexist").await.unwrap().is_none());
    }
}
