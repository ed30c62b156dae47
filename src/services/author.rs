//! Author service

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::post::{PostService, PostSummary};
use super::Resolution;
use crate::db::repositories::{PostFilter, UserRepository};
use crate::models::{Page, PageRequest, User};
use crate::urls;

/// Published posts of one author
#[derive(Debug, Clone)]
pub struct AuthorListing {
    pub author: User,
    pub page: Page<PostSummary>,
}

pub struct AuthorService {
    users: Arc<dyn UserRepository>,
    posts: Arc<PostService>,
}

impl AuthorService {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<PostService>) -> Self {
        Self { users, posts }
    }

    /// Unknown usernames send the reader back to the archive root
    pub async fn author_posts(
        &self,
        username: &str,
        request: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Resolution<AuthorListing>> {
        let Some(author) = self.users.get_by_username(username).await? else {
            tracing::debug!("Unknown author '{}', redirecting to archive", username);
            return Ok(Resolution::RedirectTemporary(urls::archive()));
        };

        let filter = PostFilter::author(author.id);
        Ok(match self.posts.published_page(&filter, request, now).await? {
            Some(page) => Resolution::Render(AuthorListing { author, page }),
            None => Resolution::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use crate::db::fixtures::{now, TestDb};
    use crate::db::repositories::{SqlxPostRepository, SqlxTagRepository, SqlxUserRepository};
    use chrono::TimeZone;

    fn service(db: &TestDb) -> AuthorService {
        let posts = PostService::new(
            SqlxPostRepository::boxed(db.pool.clone()),
            SqlxTagRepository::boxed(db.pool.clone()),
            BlogConfig::default(),
        );
        AuthorService::new(SqlxUserRepository::boxed(db.pool.clone()), Arc::new(posts))
    }

    #[tokio::test]
    async fn test_unknown_author_redirects_to_archive() {
        let db = TestDb::new().await;
        let resolution = service(&db)
            .author_posts("doesnotexist", PageRequest::default(), now())
            .await
            .unwrap();
        assert!(matches!(
            resolution,
            Resolution::RedirectTemporary(ref url) if url == "/"
        ));
    }

    #[tokio::test]
    async fn test_author_listing_only_has_their_posts() {
        let db = TestDb::new().await;
        let alice = db.user("alice").await;
        let bob = db.user("bob").await;
        let published = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();
        db.post(alice, "by-alice", Some(published), true).await;
        db.post(bob, "by-bob", Some(published), true).await;
        db.user("carol").await;

        let svc = service(&db);
        let Resolution::Render(listing) = svc
            .author_posts("alice", PageRequest::default(), now())
            .await
            .unwrap()
        else {
            panic!("alice should render");
        };
        assert_eq!(listing.author.username, "alice");
        assert_eq!(listing.page.items.len(), 1);
        assert_eq!(listing.page.items[0].post.slug, "by-alice");

        let Resolution::Render(empty) = svc
            .author_posts("carol", PageRequest::default(), now())
            .await
            .unwrap()
        else {
            panic!("carol should render an empty listing");
        };
        assert!(empty.page.items.is_empty());
    }
}
