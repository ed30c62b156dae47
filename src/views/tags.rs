//! Tag views

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};
use chrono::Utc;
use tera::Context as TeraContext;

use super::generic::{render_list, respond, PageQuery};
use super::{AppState, ViewError};
use crate::theme::names;

/// GET /tag/{tag}
pub async fn tag_detail(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let resolution = state
        .tag_service
        .tag_posts(&tag, query.request()?, Utc::now())
        .await?;

    respond(resolution, |listing| {
        let mut extra = TeraContext::new();
        extra.insert("tag", &listing.tag);
        render_list(&state, uri.path(), names::POST_LIST, "post", &listing.page, extra)
    })
}

/// GET /tags
pub async fn tag_index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let resolution = state.tag_service.tag_index(query.request()?).await?;
    respond(resolution, |page| {
        render_list(&state, uri.path(), names::TAG_LIST, "tag", &page, TeraContext::new())
    })
}
