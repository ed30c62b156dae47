//! Post service
//!
//! Turns permalink, preview and archive requests into [`Resolution`]s:
//! - canonical and WordPress-style permalinks, including the slug-prefix
//!   fallback for truncated links
//! - previews of unpublished posts
//! - the archive root, month and year archives
//!
//! Every method takes `now` so the published/scheduled boundary is decided
//! by the caller.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::markdown::MarkdownRenderer;
use super::tag::TagLink;
use super::Resolution;
use crate::config::BlogConfig;
use crate::db::repositories::post::month_start;
use crate::db::repositories::{PostFilter, PostRepository, TagRepository};
use crate::models::{Page, PageRequest, Paginator, Post, CONTENT_TYPE_POST};
use crate::urls;

/// A post as it appears in listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: Post,
    pub url: String,
    pub author_name: String,
    pub author_url: String,
}

/// A post as the detail template sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub url: String,
    pub author_name: String,
    pub author_url: String,
    pub content_html: String,
    pub tags: Vec<TagLink>,
    pub is_preview: bool,
}

/// A month archive link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLink {
    /// First day of the month
    pub month: NaiveDate,
    pub url: String,
}

impl MonthLink {
    pub fn new(month: NaiveDate) -> Self {
        Self {
            url: urls::month(month.year(), month.month()),
            month,
        }
    }
}

/// Posts of one month plus the neighbouring months that have posts
#[derive(Debug, Clone)]
pub struct MonthArchive {
    pub month: NaiveDate,
    pub previous_month: Option<MonthLink>,
    pub next_month: Option<MonthLink>,
    pub page: Page<PostSummary>,
}

/// Months of one year that have posts, optionally with the posts themselves
#[derive(Debug, Clone)]
pub struct YearArchive {
    pub year: i32,
    pub date_list: Vec<NaiveDate>,
    pub month_links: Vec<MonthLink>,
    pub previous_year: Option<i32>,
    pub next_year: Option<i32>,
    pub page: Page<PostSummary>,
}

impl YearArchive {
    pub fn previous_year_url(&self) -> Option<String> {
        self.previous_year.map(urls::year)
    }

    pub fn next_year_url(&self) -> Option<String> {
        self.next_year.map(urls::year)
    }
}

/// Post resolution and archive listings
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    renderer: MarkdownRenderer,
    config: BlogConfig,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        config: BlogConfig,
    ) -> Self {
        Self {
            posts,
            tags,
            renderer: MarkdownRenderer::new(),
            config,
        }
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    /// Canonical URL under the configured permalink style
    pub fn canonical_url(&self, post: &Post) -> String {
        urls::post(post, self.config.wp_permalinks).unwrap_or_else(|| urls::preview(post))
    }

    /// Resolve `/{year}/{slug}`
    pub async fn resolve_canonical(
        &self,
        year: i32,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution<PostDetail>> {
        let found = self.posts.get_published_in_year(year, slug, now).await?;

        if self.config.wp_permalinks {
            return Ok(match found {
                Some(post) => {
                    let url = self.canonical_url(&post);
                    tracing::debug!("Redirecting /{}/{} to dated permalink {}", year, slug, url);
                    Resolution::RedirectPermanent(url)
                }
                None => Resolution::RedirectTemporary(urls::archive()),
            });
        }

        if let Some(post) = found {
            return Ok(Resolution::Render(self.detail(post, false).await?));
        }

        // Truncated link: newest post of the year whose slug starts with it.
        match self
            .posts
            .latest_published_with_slug_prefix(year, slug, now)
            .await?
        {
            Some(post) => {
                let url = self.canonical_url(&post);
                tracing::debug!("Slug prefix '{}' in {} matched {}", slug, year, url);
                Ok(Resolution::RedirectTemporary(url))
            }
            None => Ok(Resolution::NotFound),
        }
    }

    /// Resolve `/{year}/{month}/{day}/{slug}`
    ///
    /// Month and day only matter when dated permalinks are canonical; the
    /// post itself is always found by year and slug.
    pub async fn resolve_legacy(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution<PostDetail>> {
        let wp_permalinks = self.config.wp_permalinks;

        let Some(post) = self.posts.get_published_in_year(year, slug, now).await? else {
            return Ok(if wp_permalinks {
                Resolution::RedirectTemporary(urls::archive())
            } else {
                Resolution::NotFound
            });
        };

        let requested = NaiveDate::from_ymd_opt(year, month, day);
        if wp_permalinks && requested.is_some() && requested == post.publication_date() {
            return Ok(Resolution::Render(self.detail(post, false).await?));
        }

        let url = self.canonical_url(&post);
        tracing::debug!(
            "Redirecting /{}/{:02}/{:02}/{} to {}",
            year,
            month,
            day,
            slug,
            url
        );
        Ok(Resolution::RedirectPermanent(url))
    }

    /// Resolve `/preview/{id}/{slug}`
    pub async fn resolve_preview(
        &self,
        id: i64,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution<PostDetail>> {
        match self.posts.get_by_id_and_slug(id, slug).await? {
            None => Ok(Resolution::RedirectTemporary(urls::archive())),
            Some(post) if post.is_live(now) => {
                Ok(Resolution::RedirectPermanent(self.canonical_url(&post)))
            }
            Some(post) => Ok(Resolution::Render(self.detail(post, true).await?)),
        }
    }

    /// One page of published posts matching `filter`; `None` for an invalid page
    pub async fn published_page(
        &self,
        filter: &PostFilter,
        request: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Page<PostSummary>>> {
        let count = self.posts.count_published(filter, now).await?;
        let paginator = Paginator::new(self.config.posts_per_page, count);

        let number = match paginator.validate(request) {
            Ok(number) => number,
            Err(e) => {
                tracing::debug!("Invalid page {:?}: {}", request, e);
                return Ok(None);
            }
        };

        let posts = self
            .posts
            .list_published(filter, now, paginator.offset(number), paginator.limit())
            .await?;
        Ok(Some(paginator.page(number, posts).map(|post| self.summary(post))))
    }

    /// The archive root: every published post
    pub async fn archive(
        &self,
        request: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Resolution<Page<PostSummary>>> {
        Ok(self
            .published_page(&PostFilter::all(), request, now)
            .await?
            .map_or(Resolution::NotFound, Resolution::Render))
    }

    /// Posts published in one month
    pub async fn month_archive(
        &self,
        year: i32,
        month: u32,
        request: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Resolution<MonthArchive>> {
        let (Some(filter), Some(first_day)) = (
            PostFilter::month(year, month),
            NaiveDate::from_ymd_opt(year, month, 1),
        ) else {
            return Ok(Resolution::NotFound);
        };

        let Some(page) = self.published_page(&filter, request, now).await? else {
            return Ok(Resolution::NotFound);
        };
        if page.info().count == 0 {
            return Ok(Resolution::NotFound);
        }

        let previous_month = match filter.published_from {
            Some(start) => self.posts.latest_published_before(start, now).await?,
            None => None,
        };
        let next_month = match filter.published_before {
            Some(end) => self.posts.earliest_published_from(end, now).await?,
            None => None,
        };

        Ok(Resolution::Render(MonthArchive {
            month: first_day,
            previous_month: previous_month.and_then(first_of_month).map(MonthLink::new),
            next_month: next_month.and_then(first_of_month).map(MonthLink::new),
            page,
        }))
    }

    /// Months of a year with posts; the posts themselves only when
    /// `year_post_list` is enabled
    pub async fn year_archive(
        &self,
        year: i32,
        request: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Resolution<YearArchive>> {
        let Some(filter) = PostFilter::year(year) else {
            return Ok(Resolution::NotFound);
        };

        let dates = self.posts.published_dates(&filter, now).await?;
        if dates.is_empty() {
            return Ok(Resolution::NotFound);
        }

        let page = if self.config.year_post_list {
            match self.published_page(&filter, request, now).await? {
                Some(page) => page,
                None => return Ok(Resolution::NotFound),
            }
        } else {
            Page::single(Vec::new())
        };

        let previous_year = match month_start(year, 1) {
            Some(start) => self.posts.latest_published_before(start, now).await?,
            None => None,
        };
        let next_year = match filter.published_before {
            Some(end) => self.posts.earliest_published_from(end, now).await?,
            None => None,
        };

        let date_list = months_with_posts(&dates);
        Ok(Resolution::Render(YearArchive {
            year,
            month_links: date_list.iter().copied().map(MonthLink::new).collect(),
            date_list,
            previous_year: previous_year.map(|d| d.year()),
            next_year: next_year.map(|d| d.year()),
            page,
        }))
    }

    fn summary(&self, post: Post) -> PostSummary {
        PostSummary {
            url: self.canonical_url(&post),
            author_name: post.author.name().to_string(),
            author_url: urls::author(&post.author.username),
            post,
        }
    }

    async fn detail(&self, post: Post, is_preview: bool) -> Result<PostDetail> {
        let tags = self
            .tags
            .list_for_object(CONTENT_TYPE_POST, post.id)
            .await?
            .into_iter()
            .map(TagLink::from)
            .collect();

        let url = if is_preview {
            urls::preview(&post)
        } else {
            self.canonical_url(&post)
        };

        Ok(PostDetail {
            url,
            author_name: post.author.name().to_string(),
            author_url: urls::author(&post.author.username),
            content_html: self.renderer.render(&post.content),
            tags,
            is_preview,
            post,
        })
    }
}

fn first_of_month(date: DateTime<Utc>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

/// Distinct months (as their first day) in ascending order
fn months_with_posts(dates: &[DateTime<Utc>]) -> Vec<NaiveDate> {
    let mut months: Vec<NaiveDate> = dates.iter().copied().filter_map(first_of_month).collect();
    months.sort_unstable();
    months.dedup();
    months
}
