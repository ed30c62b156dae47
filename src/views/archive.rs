//! Archive views: the archive root, years and months

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};
use chrono::Utc;
use tera::Context as TeraContext;

use super::generic::{render_list, respond, PageQuery};
use super::posts::parse_year;
use super::{AppState, ViewError};
use crate::theme::names;

/// GET /
pub async fn archive_index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let resolution = state
        .post_service
        .archive(query.request()?, Utc::now())
        .await?;
    respond(resolution, |page| {
        render_list(&state, uri.path(), names::POST_LIST, "post", &page, TeraContext::new())
    })
}

/// GET /{year}
pub async fn year_archive(
    State(state): State<AppState>,
    Path(year): Path<String>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let year = parse_year(&year)?;
    let resolution = state
        .post_service
        .year_archive(year, query.request()?, Utc::now())
        .await?;

    respond(resolution, |archive| {
        let mut extra = TeraContext::new();
        extra.insert("archive_year", &archive.year);
        extra.insert("date_list", &archive.date_list);
        extra.insert("month_links", &archive.month_links);
        extra.insert("previous_year", &archive.previous_year);
        extra.insert("previous_year_url", &archive.previous_year_url());
        extra.insert("next_year", &archive.next_year);
        extra.insert("next_year_url", &archive.next_year_url());
        render_list(&state, uri.path(), names::POST_ARCHIVE_YEAR, "post", &archive.page, extra)
    })
}

/// GET /{year}/{month}, dispatched from the shared `/{year}/{segment}` route
pub(crate) async fn month_archive(
    state: &AppState,
    year: i32,
    month: u32,
    query: &PageQuery,
    uri: &Uri,
) -> Result<Response, ViewError> {
    let resolution = state
        .post_service
        .month_archive(year, month, query.request()?, Utc::now())
        .await?;

    respond(resolution, |archive| {
        let mut extra = TeraContext::new();
        extra.insert("month", &archive.month);
        let previous = archive.previous_month.as_ref();
        let next = archive.next_month.as_ref();
        extra.insert("previous_month", &previous.map(|link| link.month));
        extra.insert("previous_month_url", &previous.map(|link| &link.url));
        extra.insert("next_month", &next.map(|link| link.month));
        extra.insert("next_month_url", &next.map(|link| &link.url));
        render_list(state, uri.path(), names::POST_ARCHIVE_MONTH, "post", &archive.page, extra)
    })
}
