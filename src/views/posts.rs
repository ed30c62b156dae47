//! Post detail and preview views

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};
use chrono::Utc;
use tera::Context as TeraContext;

use super::archive;
use super::generic::{render_detail, respond, PageQuery};
use super::{AppState, ViewError};
use crate::services::PostDetail;
use crate::theme::names;
use crate::urls;

/// Parse a year path segment; anything but digits is a 404
pub(crate) fn parse_year(segment: &str) -> Result<i32, ViewError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ViewError::NotFound);
    }
    segment.parse().map_err(|_| ViewError::NotFound)
}

fn render_post(state: &AppState, uri: &Uri, detail: PostDetail) -> Result<Response, ViewError> {
    let mut extra = TeraContext::new();
    extra.insert("author", &detail.post.author);
    extra.insert("tags", &detail.tags);
    render_detail(state, uri.path(), names::POST_DETAIL, "post", &detail, extra)
}

/// GET /{year}/{segment}
///
/// A two-digit segment is a month archive, anything else a post slug.
pub async fn year_segment(
    State(state): State<AppState>,
    Path((year, segment)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let year = parse_year(&year)?;

    if let Some(month) = urls::parse_two_digits(&segment) {
        return archive::month_archive(&state, year, month, &query, &uri).await;
    }

    let resolution = state
        .post_service
        .resolve_canonical(year, &segment, Utc::now())
        .await?;
    respond(resolution, |detail| render_post(&state, &uri, detail))
}

/// GET /{year}/{month}/{day}/{slug}
pub async fn legacy_detail(
    State(state): State<AppState>,
    Path((year, month, day, slug)): Path<(String, String, String, String)>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let year = parse_year(&year)?;
    let (Some(month), Some(day)) = (urls::parse_two_digits(&month), urls::parse_two_digits(&day))
    else {
        return Err(ViewError::NotFound);
    };

    let resolution = state
        .post_service
        .resolve_legacy(year, month, day, &slug, Utc::now())
        .await?;
    respond(resolution, |detail| render_post(&state, &uri, detail))
}

/// GET /preview/{id}/{slug}
pub async fn preview(
    State(state): State<AppState>,
    Path((id, slug)): Path<(String, String)>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let id: i64 = id.parse().map_err(|_| ViewError::NotFound)?;

    let resolution = state
        .post_service
        .resolve_preview(id, &slug, Utc::now())
        .await?;
    respond(resolution, |detail| render_post(&state, &uri, detail))
}
