//! Tag model
//!
//! Tags attach to any object through the `tagged_items` table, keyed by a
//! content type string and the object id. Posts use [`CONTENT_TYPE_POST`].

use serde::{Deserialize, Serialize};

/// Content type under which posts are tagged
pub const CONTENT_TYPE_POST: &str = "blogdor.post";

/// Tag entity; the name doubles as its URL identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name (unique)
    pub name: String,
}
