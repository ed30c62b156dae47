//! Post repository
//!
//! Every public listing starts from the same "published" condition (flag set,
//! publication date not in the future) and narrows it with a [`PostFilter`].
//! The caller supplies `now` so that results are reproducible in tests.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Post, PostAuthor, CONTENT_TYPE_POST};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;
use std::sync::Arc;

use super::Arg;

const SELECT_POST: &str = r#"
    SELECT p.id, p.title, p.slug, p.excerpt, p.content,
           p.date_created, p.date_modified, p.date_published, p.is_published,
           u.id AS author_id, u.username AS author_username, u.display_name AS author_display_name
    FROM posts p
    INNER JOIN users u ON u.id = p.author_id
"#;

const NEWEST_FIRST: &str = "ORDER BY p.date_published DESC, p.id DESC";

/// Narrows the set of published posts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Inclusive lower bound on the publication date
    pub published_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the publication date
    pub published_before: Option<DateTime<Utc>>,
    /// Only posts written by this user
    pub author_id: Option<i64>,
    /// Only posts carrying this tag
    pub tag_id: Option<i64>,
}

impl PostFilter {
    /// Every published post
    pub fn all() -> Self {
        Self::default()
    }

    /// Posts published during `year` (UTC); `None` for years chrono cannot represent
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            published_from: Some(month_start(year, 1)?),
            published_before: Some(month_start(year.checked_add(1)?, 1)?),
            ..Self::default()
        })
    }

    /// Posts published during `month` of `year`; `None` for an invalid month
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1)?, 1)
        } else {
            (year, month + 1)
        };
        Some(Self {
            published_from: Some(month_start(year, month)?),
            published_before: Some(month_start(next_year, next_month)?),
            ..Self::default()
        })
    }

    /// Posts written by `author_id`
    pub fn author(author_id: i64) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    /// Posts tagged with `tag_id`
    pub fn tag(tag_id: i64) -> Self {
        Self {
            tag_id: Some(tag_id),
            ..Self::default()
        }
    }

    /// WHERE clause (without the keyword) and its arguments
    fn where_clause(&self, now: DateTime<Utc>) -> (String, Vec<Arg>) {
        let mut sql = String::from(
            "p.is_published = 1 AND p.date_published IS NOT NULL AND p.date_published <= ?",
        );
        let mut args = vec![Arg::Time(now)];

        if let Some(from) = self.published_from {
            sql.push_str(" AND p.date_published >= ?");
            args.push(Arg::Time(from));
        }
        if let Some(before) = self.published_before {
            sql.push_str(" AND p.date_published < ?");
            args.push(Arg::Time(before));
        }
        if let Some(author_id) = self.author_id {
            sql.push_str(" AND p.author_id = ?");
            args.push(Arg::Int(author_id));
        }
        if let Some(tag_id) = self.tag_id {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM tagged_items ti \
                 WHERE ti.object_id = p.id AND ti.content_type = ? AND ti.tag_id = ?)",
            );
            args.push(Arg::Text(CONTENT_TYPE_POST.to_string()));
            args.push(Arg::Int(tag_id));
        }

        (sql, args)
    }
}

/// Midnight UTC on the first day of a month
pub fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

/// Escape `LIKE` wildcards; pairs with `ESCAPE '!'`
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Any post, published or not, by id and slug
    async fn get_by_id_and_slug(&self, id: i64, slug: &str) -> Result<Option<Post>>;

    /// The published post of `year` with exactly `slug`
    async fn get_published_in_year(
        &self,
        year: i32,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>>;

    /// The most recently published post of `year` whose slug starts with `prefix`
    async fn latest_published_with_slug_prefix(
        &self,
        year: i32,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>>;

    /// Published posts matching `filter`, newest first
    async fn list_published(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>>;

    /// Number of published posts matching `filter`
    async fn count_published(&self, filter: &PostFilter, now: DateTime<Utc>) -> Result<i64>;

    /// Publication dates of the posts matching `filter`, oldest first
    async fn published_dates(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>>;

    /// Publication date of the newest published post strictly before `before`
    async fn latest_published_before(
        &self,
        before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Publication date of the oldest published post at or after `from`
    async fn earliest_published_from(
        &self,
        from: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }

    async fn fetch_posts(&self, sql: &str, args: &[Arg], what: &'static str) -> Result<Vec<Post>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                let rows = bind_args!(sqlx::query(sql), args)
                    .fetch_all(pool)
                    .await
                    .context(what)?;
                rows.iter().map(post_from_sqlite).collect()
            }
            Backend::Mysql(pool) => {
                let rows = bind_args!(sqlx::query(sql), args)
                    .fetch_all(pool)
                    .await
                    .context(what)?;
                rows.iter().map(post_from_mysql).collect()
            }
        }
    }

    async fn fetch_post(&self, sql: &str, args: &[Arg], what: &'static str) -> Result<Option<Post>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                let row = bind_args!(sqlx::query(sql), args)
                    .fetch_optional(pool)
                    .await
                    .context(what)?;
                row.as_ref().map(post_from_sqlite).transpose()
            }
            Backend::Mysql(pool) => {
                let row = bind_args!(sqlx::query(sql), args)
                    .fetch_optional(pool)
                    .await
                    .context(what)?;
                row.as_ref().map(post_from_mysql).transpose()
            }
        }
    }

    async fn fetch_dates(
        &self,
        sql: &str,
        args: &[Arg],
        what: &'static str,
    ) -> Result<Vec<DateTime<Utc>>> {
        let dates = match self.pool.backend()? {
            Backend::Sqlite(pool) => bind_args!(sqlx::query(sql), args)
                .fetch_all(pool)
                .await
                .context(what)?
                .iter()
                .map(|row| row.try_get("date_published"))
                .collect::<Result<Vec<_>, _>>()?,
            Backend::Mysql(pool) => bind_args!(sqlx::query(sql), args)
                .fetch_all(pool)
                .await
                .context(what)?
                .iter()
                .map(|row| row.try_get("date_published"))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(dates)
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn get_by_id_and_slug(&self, id: i64, slug: &str) -> Result<Option<Post>> {
        let sql = format!("{} WHERE p.id = ? AND p.slug = ?", SELECT_POST);
        let args = [Arg::Int(id), Arg::Text(slug.to_string())];
        self.fetch_post(&sql, &args, "Failed to get post by id and slug").await
    }

    async fn get_published_in_year(
        &self,
        year: i32,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let Some(filter) = PostFilter::year(year) else {
            return Ok(None);
        };
        let (clause, mut args) = filter.where_clause(now);
        let sql = format!(
            "{} WHERE {} AND p.slug = ? {} LIMIT 1",
            SELECT_POST, clause, NEWEST_FIRST
        );
        args.push(Arg::Text(slug.to_string()));
        self.fetch_post(&sql, &args, "Failed to get published post by slug").await
    }

    async fn latest_published_with_slug_prefix(
        &self,
        year: i32,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let Some(filter) = PostFilter::year(year) else {
            return Ok(None);
        };
        let (clause, mut args) = filter.where_clause(now);
        let sql = format!(
            "{} WHERE {} AND p.slug LIKE ? ESCAPE '!' {} LIMIT 1",
            SELECT_POST, clause, NEWEST_FIRST
        );
        args.push(Arg::Text(format!("{}%", escape_like(prefix))));
        self.fetch_post(&sql, &args, "Failed to search posts by slug prefix").await
    }

    async fn list_published(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let (clause, mut args) = filter.where_clause(now);
        let sql = format!(
            "{} WHERE {} {} LIMIT ? OFFSET ?",
            SELECT_POST, clause, NEWEST_FIRST
        );
        args.push(Arg::Int(limit));
        args.push(Arg::Int(offset));
        self.fetch_posts(&sql, &args, "Failed to list published posts").await
    }

    async fn count_published(&self, filter: &PostFilter, now: DateTime<Utc>) -> Result<i64> {
        let (clause, args) = filter.where_clause(now);
        let sql = format!("SELECT COUNT(*) AS count FROM posts p WHERE {}", clause);

        let count = match self.pool.backend()? {
            Backend::Sqlite(pool) => bind_args!(sqlx::query(&sql), args)
                .fetch_one(pool)
                .await
                .context("Failed to count published posts")?
                .try_get("count")?,
            Backend::Mysql(pool) => bind_args!(sqlx::query(&sql), args)
                .fetch_one(pool)
                .await
                .context("Failed to count published posts")?
                .try_get("count")?,
        };
        Ok(count)
    }

    async fn published_dates(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let (clause, args) = filter.where_clause(now);
        let sql = format!(
            "SELECT p.date_published FROM posts p WHERE {} ORDER BY p.date_published ASC",
            clause
        );
        self.fetch_dates(&sql, &args, "Failed to list publication dates").await
    }

    async fn latest_published_before(
        &self,
        before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let filter = PostFilter {
            published_before: Some(before),
            ..PostFilter::all()
        };
        let (clause, args) = filter.where_clause(now);
        let sql = format!(
            "SELECT p.date_published FROM posts p WHERE {} ORDER BY p.date_published DESC LIMIT 1",
            clause
        );
        let dates = self.fetch_dates(&sql, &args, "Failed to find previous post date").await?;
        Ok(dates.into_iter().next())
    }

    async fn earliest_published_from(
        &self,
        from: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let filter = PostFilter {
            published_from: Some(from),
            ..PostFilter::all()
        };
        let (clause, args) = filter.where_clause(now);
        let sql = format!(
            "SELECT p.date_published FROM posts p WHERE {} ORDER BY p.date_published ASC LIMIT 1",
            clause
        );
        let dates = self.fetch_dates(&sql, &args, "Failed to find next post date").await?;
        Ok(dates.into_iter().next())
    }
}

macro_rules! post_from_row {
    ($row:expr) => {
        Post {
            id: $row.try_get("id")?,
            title: $row.try_get("title")?,
            slug: $row.try_get("slug")?,
            author: PostAuthor {
                id: $row.try_get("author_id")?,
                username: $row.try_get("author_username")?,
                display_name: $row.try_get("author_display_name")?,
            },
            excerpt: $row.try_get("excerpt")?,
            content: $row.try_get("content")?,
            date_created: $row.try_get("date_created")?,
            date_modified: $row.try_get("date_modified")?,
            date_published: $row.try_get("date_published")?,
            is_published: $row.try_get("is_published")?,
        }
    };
}

fn post_from_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(post_from_row!(row))
}

fn post_from_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    Ok(post_from_row!(row))
}
