//! Services layer
//!
//! Services sit between the views and the repositories. Each request is
//! resolved into a [`Resolution`]: something to render, a redirect, or a
//! 404. Views only translate that into HTTP.

pub mod author;
pub mod markdown;
pub mod post;
mod resolution;
pub mod tag;

pub use author::{AuthorListing, AuthorService};
pub use markdown::MarkdownRenderer;
pub use post::{MonthArchive, MonthLink, PostDetail, PostService, PostSummary, YearArchive};
pub use resolution::Resolution;
pub use tag::{TagLink, TagListing, TagService};
