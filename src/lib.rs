//! Blogdor - blog front-end
//!
//! Resolves permalinks, archives, tag and author listings and post previews
//! against a SQLite or MySQL store and renders them with Tera templates.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
pub mod urls;
pub mod views;
