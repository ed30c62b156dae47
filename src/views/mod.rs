//! HTML views and routing
//!
//! Routes:
//! - `/` archive root
//! - `/{year}` year archive
//! - `/{year}/{month}` month archive (two-digit month)
//! - `/{year}/{slug}` post detail
//! - `/{year}/{month}/{day}/{slug}` WordPress-style post detail
//! - `/preview/{id}/{slug}` unpublished post preview
//! - `/tags`, `/tag/{tag}` tag index and tag listing
//! - `/author/{username}` author listing

pub mod archive;
pub mod authors;
pub mod error;
pub mod generic;
pub mod posts;
pub mod tags;

#[cfg(test)]
mod tests;

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{BlogConfig, SiteConfig};
use crate::db::repositories::{SqlxPostRepository, SqlxTagRepository, SqlxUserRepository};
use crate::db::DynDatabasePool;
use crate::services::{AuthorService, PostService, TagService};
use crate::theme::{StandardTemplateVars, ThemeEngine};

pub use error::ViewError;

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub tag_service: Arc<TagService>,
    pub author_service: Arc<AuthorService>,
    pub theme_engine: Arc<ThemeEngine>,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Wire repositories and services over one pool
    pub fn new(
        pool: DynDatabasePool,
        blog: BlogConfig,
        site: SiteConfig,
        theme_engine: ThemeEngine,
    ) -> Self {
        let tag_repo = SqlxTagRepository::boxed(pool.clone());
        let post_service = Arc::new(PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            tag_repo.clone(),
            blog,
        ));
        let tag_service = Arc::new(TagService::new(tag_repo, post_service.clone()));
        let author_service = Arc::new(AuthorService::new(
            SqlxUserRepository::boxed(pool),
            post_service.clone(),
        ));

        Self {
            post_service,
            tag_service,
            author_service,
            theme_engine: Arc::new(theme_engine),
            site: Arc::new(site),
        }
    }

    pub fn standard_vars(&self, request_path: &str) -> StandardTemplateVars {
        StandardTemplateVars::new(&self.site.name, &self.site.description, request_path)
    }
}

/// Build the blog router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(archive::archive_index))
        .route("/tags", get(tags::tag_index))
        .route("/tag/{tag}", get(tags::tag_detail))
        .route("/author/{username}", get(authors::author_detail))
        .route("/preview/{id}/{slug}", get(posts::preview))
        .route("/{year}", get(archive::year_archive))
        .route("/{year}/{segment}", get(posts::year_segment))
        .route("/{year}/{month}/{day}/{slug}", get(posts::legacy_detail))
        .fallback(error::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            error::error_pages,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
