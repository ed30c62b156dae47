//! Generic list and detail rendering
//!
//! Every listing goes through [`render_list`] and every single post through
//! [`render_detail`]. View-specific values (the tag, the author, the month)
//! are passed in as an explicit extra context rather than smuggled through
//! shared state.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tera::Context as TeraContext;

use super::{AppState, ViewError};
use crate::models::{Page, PageRequest};
use crate::services::Resolution;

/// `?page=` query string
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Malformed page values are a 404, like out-of-range ones
    pub fn request(&self) -> Result<PageRequest, ViewError> {
        PageRequest::parse(self.page.as_deref()).map_err(|e| {
            tracing::debug!("Bad page parameter {:?}: {}", self.page, e);
            ViewError::NotFound
        })
    }
}

/// Turn a resolution into a response, rendering with `render` when there is
/// something to show
pub fn respond<T>(
    resolution: Resolution<T>,
    render: impl FnOnce(T) -> Result<Response, ViewError>,
) -> Result<Response, ViewError> {
    match resolution {
        Resolution::Render(value) => render(value),
        Resolution::RedirectPermanent(url) => Ok(redirect(StatusCode::MOVED_PERMANENTLY, url)),
        Resolution::RedirectTemporary(url) => Ok(redirect(StatusCode::FOUND, url)),
        Resolution::NotFound => Err(ViewError::NotFound),
    }
}

fn redirect(status: StatusCode, location: String) -> Response {
    (status, [(header::LOCATION, location)]).into_response()
}

/// Render a paginated listing
///
/// The items are exposed as `<object_name>_list` and `object_list`, the page
/// metadata as `page_obj` and `is_paginated`.
pub fn render_list<T: Serialize>(
    state: &AppState,
    request_path: &str,
    template: &str,
    object_name: &str,
    page: &Page<T>,
    extra: TeraContext,
) -> Result<Response, ViewError> {
    let info = page.info();
    let mut context = TeraContext::new();
    context.insert(format!("{}_list", object_name), &page.items);
    context.insert("object_list", &page.items);
    context.insert("is_paginated", &(info.num_pages > 1));
    context.insert("page_obj", &info);
    context.extend(extra);

    render(state, request_path, template, &context)
}

/// Render a single object as `<object_name>` and `object`
pub fn render_detail<T: Serialize>(
    state: &AppState,
    request_path: &str,
    template: &str,
    object_name: &str,
    object: &T,
    extra: TeraContext,
) -> Result<Response, ViewError> {
    let mut context = TeraContext::new();
    context.insert(object_name, object);
    context.insert("object", object);
    context.extend(extra);

    render(state, request_path, template, &context)
}

fn render(
    state: &AppState,
    request_path: &str,
    template: &str,
    context: &TeraContext,
) -> Result<Response, ViewError> {
    let vars = state.standard_vars(request_path);
    let html = state
        .theme_engine
        .render_with_standard_vars(template, context, &vars)?;
    Ok(Html(html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query() {
        let query = PageQuery { page: Some("last".to_string()) };
        assert_eq!(query.request().unwrap(), PageRequest::Last);

        let query = PageQuery::default();
        assert_eq!(query.request().unwrap(), PageRequest::Number(1));

        let query = PageQuery { page: Some(String::new()) };
        assert_eq!(query.request().unwrap(), PageRequest::Number(1));

        let query = PageQuery { page: Some("1.5".to_string()) };
        assert!(matches!(query.request(), Err(ViewError::NotFound)));
    }

    #[test]
    fn test_respond_redirect_statuses() {
        let permanent = respond(
            Resolution::<()>::RedirectPermanent("/2023/hello".to_string()),
            |_| unreachable!(),
        )
        .unwrap();
        assert_eq!(permanent.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(permanent.headers()[header::LOCATION], "/2023/hello");

        let temporary =
            respond(Resolution::<()>::RedirectTemporary("/".to_string()), |_| unreachable!())
                .unwrap();
        assert_eq!(temporary.status(), StatusCode::FOUND);

        let missing = respond(Resolution::<()>::NotFound, |_| unreachable!());
        assert!(matches!(missing, Err(ViewError::NotFound)));
    }
}
