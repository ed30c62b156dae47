//! Tag service
//!
//! Resolves tag names to post listings and lists the tags in use on posts.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::post::{PostService, PostSummary};
use super::Resolution;
use crate::db::repositories::{PostFilter, TagRepository};
use crate::models::{Page, PageRequest, Paginator, Tag, CONTENT_TYPE_POST};
use crate::urls;

/// A tag with its listing URL, as templates see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub id: i64,
    pub name: String,
    pub url: String,
}

impl From<Tag> for TagLink {
    fn from(tag: Tag) -> Self {
        Self {
            url: urls::tag(&tag.name),
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Published posts carrying one tag
#[derive(Debug, Clone)]
pub struct TagListing {
    pub tag: TagLink,
    pub page: Page<PostSummary>,
}

/// Tag listings
pub struct TagService {
    tags: Arc<dyn TagRepository>,
    posts: Arc<PostService>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>, posts: Arc<PostService>) -> Self {
        Self { tags, posts }
    }

    /// Posts tagged `name`; unknown tags are not found, known but unused
    /// tags render an empty page
    pub async fn tag_posts(
        &self,
        name: &str,
        request: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Resolution<TagListing>> {
        let Some(tag) = self.tags.get_by_name(name).await? else {
            tracing::debug!("Unknown tag '{}'", name);
            return Ok(Resolution::NotFound);
        };

        let filter = PostFilter::tag(tag.id);
        Ok(match self.posts.published_page(&filter, request, now).await? {
            Some(page) => Resolution::Render(TagListing {
                tag: TagLink::from(tag),
                page,
            }),
            None => Resolution::NotFound,
        })
    }

    /// Every tag used on at least one post, by name
    pub async fn tag_index(&self, request: PageRequest) -> Result<Resolution<Page<TagLink>>> {
        let count = self.tags.count_used(CONTENT_TYPE_POST).await?;
        let paginator = Paginator::new(self.posts.config().posts_per_page, count);

        let Ok(number) = paginator.validate(request) else {
            return Ok(Resolution::NotFound);
        };

        let tags = self
            .tags
            .list_used(CONTENT_TYPE_POST, paginator.offset(number), paginator.limit())
            .await?;
        Ok(Resolution::Render(
            paginator.page(number, tags).map(TagLink::from),
        ))
    }
}
