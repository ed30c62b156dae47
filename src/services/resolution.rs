//! Outcome of resolving a request against the blog's content

/// What a view should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Render the resolved value
    Render(T),
    /// 301 to a canonical URL
    RedirectPermanent(String),
    /// 302 to a fallback URL
    RedirectTemporary(String),
    /// 404
    NotFound,
}
