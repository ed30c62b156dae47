//! Database repositories
//!
//! Read-only repository traits plus their sqlx implementations. Queries are
//! written once with `?` placeholders, which both SQLite and MySQL accept;
//! only the row types differ per driver.

use chrono::{DateTime, Utc};

/// A positional query argument, bound in order onto either backend
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Arg {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

/// Bind a slice of [`Arg`]s onto a sqlx query, whatever its database
macro_rules! bind_args {
    ($query:expr, $args:expr) => {{
        let mut query = $query;
        for arg in $args.iter() {
            query = match arg {
                $crate::db::repositories::Arg::Int(value) => query.bind(*value),
                $crate::db::repositories::Arg::Text(value) => query.bind(value.clone()),
                $crate::db::repositories::Arg::Time(value) => query.bind(*value),
            };
        }
        query
    }};
}

pub mod post;
pub mod tag;
pub mod user;

pub use post::{PostFilter, PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
