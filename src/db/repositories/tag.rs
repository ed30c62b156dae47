//! Tag repository
//!
//! Tags reach posts through the generic `tagged_items` table, so every query
//! that concerns posts is scoped by content type.

use crate::db::{Backend, DynDatabasePool};
use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use super::Arg;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Get tag by its exact name
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Tags attached to at least one object of `content_type`, ordered by name
    async fn list_used(&self, content_type: &str, offset: i64, limit: i64) -> Result<Vec<Tag>>;

    /// Number of tags attached to at least one object of `content_type`
    async fn count_used(&self, content_type: &str) -> Result<i64>;

    /// Tags attached to a single object, ordered by name
    async fn list_for_object(&self, content_type: &str, object_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }

    async fn fetch_tags(&self, sql: &str, args: &[Arg], what: &'static str) -> Result<Vec<Tag>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => bind_args!(sqlx::query(sql), args)
                .fetch_all(pool)
                .await
                .context(what)?
                .iter()
                .map(tag_from_sqlite)
                .collect(),
            Backend::Mysql(pool) => bind_args!(sqlx::query(sql), args)
                .fetch_all(pool)
                .await
                .context(what)?
                .iter()
                .map(tag_from_mysql)
                .collect(),
        }
    }
}

const USED_TAGS: &str = r#"
    FROM tags t
    WHERE EXISTS (
        SELECT 1 FROM tagged_items ti
        WHERE ti.tag_id = t.id AND ti.content_type = ?
    )
"#;

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let sql = "SELECT id, name FROM tags WHERE name = ?";
        let tags = self
            .fetch_tags(sql, &[Arg::Text(name.to_string())], "Failed to get tag by name")
            .await?;
        Ok(tags.into_iter().next())
    }

    async fn list_used(&self, content_type: &str, offset: i64, limit: i64) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT t.id, t.name {} ORDER BY t.name ASC, t.id ASC LIMIT ? OFFSET ?",
            USED_TAGS
        );
        let args = [
            Arg::Text(content_type.to_string()),
            Arg::Int(limit),
            Arg::Int(offset),
        ];
        self.fetch_tags(&sql, &args, "Failed to list tags").await
    }

    async fn count_used(&self, content_type: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) AS count {}", USED_TAGS);
        let args = [Arg::Text(content_type.to_string())];

        let count = match self.pool.backend()? {
            Backend::Sqlite(pool) => bind_args!(sqlx::query(&sql), args)
                .fetch_one(pool)
                .await
                .context("Failed to count tags")?
                .try_get("count")?,
            Backend::Mysql(pool) => bind_args!(sqlx::query(&sql), args)
                .fetch_one(pool)
                .await
                .context("Failed to count tags")?
                .try_get("count")?,
        };
        Ok(count)
    }

    async fn list_for_object(&self, content_type: &str, object_id: i64) -> Result<Vec<Tag>> {
        let sql = r#"
            SELECT t.id, t.name
            FROM tags t
            INNER JOIN tagged_items ti ON ti.tag_id = t.id
            WHERE ti.content_type = ? AND ti.object_id = ?
            ORDER BY t.name ASC
        "#;
        let args = [Arg::Text(content_type.to_string()), Arg::Int(object_id)];
        self.fetch_tags(sql, &args, "Failed to list tags for object").await
    }
}

fn tag_from_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn tag_from_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}
