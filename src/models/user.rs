//! User model
//!
//! Users are owned by an external account system; the blog only looks them
//! up by username to list their posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique, used in author URLs)
    pub username: String,
    /// Full name for bylines, may be empty
    pub display_name: String,
    /// Email address
    #[serde(skip_serializing)]
    pub email: String,
    /// When the account was created
    pub date_joined: DateTime<Utc>,
}
