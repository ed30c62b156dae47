//! Database layer
//!
//! Read access to posts, tags and authors over SQLite (default, single-file
//! deployment) or MySQL. The driver is chosen by configuration; repositories
//! hold a [`DynDatabasePool`] and branch on its [`Backend`].
//!
//! ```ignore
//! use blogdor::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

#[cfg(test)]
pub mod fixtures;
pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};
