//! Author view

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

/// GET /author/{username}
pub async fn author_detail(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let resolution = state
        .author_service
        .author_posts(&username, query.request()?, Utc::now())
        .await?;

    respond(resolution, |listing| {
        let mut extra = TeraContext::new();
        extra.insert("author", &listing.author);
        render_list(&state, uri.path(), names::POST_LIST, "post", &listing.page, extra)
    })
}
