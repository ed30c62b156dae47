//! Test fixtures: an in-memory database with helpers to seed authors, posts
//! and tags.

use chrono::{DateTime, TimeZone, Utc};

use super::{create_test_pool, migrations::run_migrations, DynDatabasePool};
use crate::models::CONTENT_TYPE_POST;

/// Fixed "current time" for repository and service tests
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Migrated in-memory SQLite database
pub struct TestDb {
    pub pool: DynDatabasePool,
}

impl TestDb {
    pub async fn new() -> Self {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        Self { pool }
    }

    fn sqlite(&self) -> &sqlx::SqlitePool {
        self.pool.as_sqlite().expect("test pool is SQLite")
    }

    pub async fn user(&self, username: &str) -> i64 {
        sqlx::query(
            "INSERT INTO users (username, display_name, email, date_joined) VALUES (?, '', ?, ?)",
        )
        .bind(username)
        .bind(format!("{}@example.com", username))
        .bind(now())
        .execute(self.sqlite())
        .await
        .expect("Failed to insert user")
        .last_insert_rowid()
    }

    /// Insert a post titled after its slug
    pub async fn post(
        &self,
        author_id: i64,
        slug: &str,
        date_published: Option<DateTime<Utc>>,
        is_published: bool,
    ) -> i64 {
        let content = format!("Content of *{}*", slug);
        self.post_with_content(author_id, slug, date_published, is_published, &content)
            .await
    }

    pub async fn post_with_content(
        &self,
        author_id: i64,
        slug: &str,
        date_published: Option<DateTime<Utc>>,
        is_published: bool,
        content: &str,
    ) -> i64 {
        let created = date_published.unwrap_or_else(now);
        sqlx::query(
            r#"
            INSERT INTO posts (title, slug, author_id, excerpt, content,
                               date_created, date_modified, date_published, is_published)
            VALUES (?, ?, ?, NULL, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(slug.replace('-', " "))
        .bind(slug)
        .bind(author_id)
        .bind(content)
        .bind(created)
        .bind(created)
        .bind(date_published)
        .bind(is_published)
        .execute(self.sqlite())
        .await
        .expect("Failed to insert post")
        .last_insert_rowid()
    }

    pub async fn tag(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(self.sqlite())
            .await
            .expect("Failed to insert tag")
            .last_insert_rowid()
    }

    pub async fn tag_post(&self, tag_id: i64, post_id: i64) {
        self.tag_object(tag_id, CONTENT_TYPE_POST, post_id).await;
    }

    pub async fn tag_object(&self, tag_id: i64, content_type: &str, object_id: i64) {
        sqlx::query("INSERT INTO tagged_items (tag_id, content_type, object_id) VALUES (?, ?, ?)")
            .bind(tag_id)
            .bind(content_type)
            .bind(object_id)
            .execute(self.sqlite())
            .await
            .expect("Failed to tag object");
    }
}
