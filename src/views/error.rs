//! View errors
//!
//! A handler fails with either "nothing here" or an internal error. Neither
//! knows about templates: the response is tagged with an [`ErrorPage`]
//! extension and [`error_pages`] renders `404.html` around it.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tera::Context as TeraContext;

use super::AppState;
use crate::theme::names;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Marks a response whose body should be replaced with a rendered error page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    NotFound,
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        match self {
            ViewError::NotFound => {
                let mut response = (StatusCode::NOT_FOUND, "Not Found").into_response();
                response.extensions_mut().insert(ErrorPage::NotFound);
                response
            }
            ViewError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Render `404.html` for responses tagged with [`ErrorPage::NotFound`]
pub async fn error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if response.extensions().get::<ErrorPage>() != Some(&ErrorPage::NotFound) {
        return response;
    }

    let vars = state.standard_vars(&path);
    let body = state.theme_engine.render_with_fallback(
        names::NOT_FOUND,
        &TeraContext::new(),
        &vars,
        "Not Found",
    );
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

/// Router fallback for unmatched paths
pub async fn not_found() -> ViewError {
    ViewError::NotFound
}
