//! Configuration management
//!
//! Configuration is read once at startup from `config.yml`, then environment
//! variables (`BLOGDOR_*`) override individual values. Missing values fall
//! back to defaults, so an absent or empty file yields a working setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blog behaviour (pagination, permalinks, year archive)
    #[serde(default)]
    pub blog: BlogConfig,
    /// Site identity injected into every template
    #[serde(default)]
    pub site: SiteConfig,
    /// Template overrides
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/blogdor.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Blog behaviour shared by every request handler.
///
/// Fixed at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Page size for every paginated listing
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: u32,
    /// Year archive carries the full post list, not only the month list
    #[serde(default)]
    pub year_post_list: bool,
    /// WordPress-style `/{year}/{month}/{day}/{slug}` permalinks are canonical
    #[serde(default)]
    pub wp_permalinks: bool,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            year_post_list: false,
            wp_permalinks: false,
        }
    }
}

fn default_posts_per_page() -> u32 {
    10
}

/// Site identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Blog name
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Blog tagline
    #[serde(default)]
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            description: String::new(),
        }
    }
}

fn default_site_name() -> String {
    "Blog".to_string()
}

/// Template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory whose `.html` files override the built-in templates
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing or empty file yields the defaults. A file that exists but is
    /// not valid YAML is an error carrying the line and column.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, then apply environment variable overrides
    ///
    /// Recognised variables:
    /// - BLOGDOR_SERVER_HOST / BLOGDOR_SERVER_PORT
    /// - BLOGDOR_DATABASE_DRIVER / BLOGDOR_DATABASE_URL
    /// - BLOGDOR_POSTS_PER_PAGE / BLOGDOR_YEAR_POST_LIST / BLOGDOR_WP_PERMALINKS
    /// - BLOGDOR_SITE_NAME / BLOGDOR_SITE_DESCRIPTION
    /// - BLOGDOR_TEMPLATES_PATH
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values no handler can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blog.posts_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "blog.posts_per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides; unparseable values are ignored
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BLOGDOR_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BLOGDOR_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(driver) = std::env::var("BLOGDOR_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {}
            }
        }
        if let Ok(url) = std::env::var("BLOGDOR_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(per_page) = std::env::var("BLOGDOR_POSTS_PER_PAGE") {
            if let Ok(per_page) = per_page.parse::<u32>() {
                self.blog.posts_per_page = per_page;
            }
        }
        if let Some(flag) = env_flag("BLOGDOR_YEAR_POST_LIST") {
            self.blog.year_post_list = flag;
        }
        if let Some(flag) = env_flag("BLOGDOR_WP_PERMALINKS") {
            self.blog.wp_permalinks = flag;
        }

        if let Ok(name) = std::env::var("BLOGDOR_SITE_NAME") {
            self.site.name = name;
        }
        if let Ok(description) = std::env::var("BLOGDOR_SITE_DESCRIPTION") {
            self.site.description = description;
        }

        if let Ok(path) = std::env::var("BLOGDOR_TEMPLATES_PATH") {
            self.templates.path = Some(PathBuf::from(path));
        }
    }
}

/// Read a boolean environment variable (`true/false`, `1/0`, `yes/no`, `on/off`)
fn env_flag(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches process environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
