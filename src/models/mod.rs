//! Data models
//!
//! Read-only views of the entities the blog renders:
//! - `Post` with its joined author
//! - `Tag`, attached to posts through generic tagged items
//! - `User`, the author of posts
//! - pagination types shared by every listing

mod pagination;
mod post;
mod tag;
mod user;

pub use pagination::{InvalidPage, Page, PageInfo, PageRequest, Paginator};
pub use post::{Post, PostAuthor};
pub use tag::{Tag, CONTENT_TYPE_POST};
pub use user::User;
