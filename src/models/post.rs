//! Post model
//!
//! A post is visible on the public site once it is flagged as published and
//! its publication date has passed. Everything else (drafts, scheduled posts)
//! is only reachable through the preview URL.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Post entity, loaded together with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly slug, unique per publication year
    pub slug: String,
    /// Author of the post
    pub author: PostAuthor,
    /// Optional teaser shown in listings
    pub excerpt: Option<String>,
    /// Markdown content
    pub content: String,
    /// Creation timestamp
    pub date_created: DateTime<Utc>,
    /// Last modification timestamp
    pub date_modified: DateTime<Utc>,
    /// Publication timestamp (absent for drafts)
    pub date_published: Option<DateTime<Utc>>,
    /// Editorial published flag
    pub is_published: bool,
}

/// The subset of the author record that posts are rendered with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl PostAuthor {
    /// Name to show in bylines, falling back to the username
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

impl Post {
    /// Whether the post is visible on the public site at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.date_published.map_or(false, |published| published <= now)
    }

    /// Calendar date of publication
    pub fn publication_date(&self) -> Option<NaiveDate> {
        self.date_published.map(|dt| dt.date_naive())
    }
}
