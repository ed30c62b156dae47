//! Theme engine
//!
//! Template rendering using Tera.
//! Features:
//! - Built-in templates compiled into the binary
//! - Per-file overrides from a configured directory
//! - Standard template variables
//! - Fallback page when a template cannot be rendered

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::urls;

mod error;

pub use error::ThemeError;

/// Template names the views render
pub mod names {
    pub const POST_DETAIL: &str = "blogdor/post_detail.html";
    pub const POST_LIST: &str = "blogdor/post_list.html";
    pub const POST_ARCHIVE_MONTH: &str = "blogdor/post_archive_month.html";
    pub const POST_ARCHIVE_YEAR: &str = "blogdor/post_archive_year.html";
    pub const TAG_LIST: &str = "blogdor/tag_list.html";
    pub const NOT_FOUND: &str = "404.html";
}

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("404.html", include_str!("../../templates/404.html")),
    (
        "blogdor/_pagination.html",
        include_str!("../../templates/blogdor/_pagination.html"),
    ),
    (
        names::POST_DETAIL,
        include_str!("../../templates/blogdor/post_detail.html"),
    ),
    (
        names::POST_LIST,
        include_str!("../../templates/blogdor/post_list.html"),
    ),
    (
        names::POST_ARCHIVE_MONTH,
        include_str!("../../templates/blogdor/post_archive_month.html"),
    ),
    (
        names::POST_ARCHIVE_YEAR,
        include_str!("../../templates/blogdor/post_archive_year.html"),
    ),
    (
        names::TAG_LIST,
        include_str!("../../templates/blogdor/tag_list.html"),
    ),
];

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine
    ///
    /// Built-in templates are always loaded; every `.html` file under
    /// `override_path` replaces the built-in template of the same relative
    /// name or adds a new one.
    pub fn new(override_path: Option<&Path>) -> Result<Self> {
        let tera = load_templates(override_path)?;
        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ThemeError::TemplateError(error_msg).into()
        })
    }

    /// Render a template with the standard variables added to `context`
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> Result<String> {
        let mut full_context = context.clone();
        full_context.insert("site_name", &standard_vars.site_name);
        full_context.insert("site_description", &standard_vars.site_description);
        full_context.insert("request_path", &standard_vars.request_path);
        full_context.insert("year", &standard_vars.year);
        full_context.insert("archive_url", &standard_vars.archive_url);
        full_context.insert("tags_url", &standard_vars.tags_url);

        self.render(template, &full_context)
    }

    /// Render a template, or a minimal HTML page if that fails
    pub fn render_with_fallback(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
        title: &str,
    ) -> String {
        match self.render_with_standard_vars(template, context, standard_vars) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}, using plain page", template, e);
                Self::simple_page(title, &standard_vars.site_name)
            }
        }
    }

    fn simple_page(title: &str, site_name: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} | {site}</title>
</head>
<body>
    <h1>{title}</h1>
    <p><a href="{root}">{site}</a></p>
</body>
</html>"#,
            title = tera::escape_html(title),
            site = tera::escape_html(site_name),
            root = urls::ARCHIVE_ROOT,
        )
    }
}

/// Variables every template receives
#[derive(Debug, Clone, Serialize)]
pub struct StandardTemplateVars {
    /// Blog name
    pub site_name: String,
    /// Blog description
    pub site_description: String,
    /// Current request path
    pub request_path: String,
    /// Current year (for copyright)
    pub year: i32,
    /// Link targets for the site navigation
    pub archive_url: String,
    pub tags_url: String,
}

impl StandardTemplateVars {
    pub fn new(
        site_name: impl Into<String>,
        site_description: impl Into<String>,
        request_path: impl Into<String>,
    ) -> Self {
        use chrono::Datelike;
        Self {
            site_name: site_name.into(),
            site_description: site_description.into(),
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
            archive_url: urls::archive(),
            tags_url: urls::tags(),
        }
    }
}

fn load_templates(override_path: Option<&Path>) -> Result<Tera> {
    let mut templates: BTreeMap<String, String> = BUILTIN_TEMPLATES
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect();

    if let Some(path) = override_path {
        if !path.is_dir() {
            return Err(ThemeError::DirectoryNotFound(path.display().to_string()).into());
        }
        let mut overrides = Vec::new();
        collect_templates_from_dir(path, path, &mut overrides)?;
        for (name, content) in overrides {
            tracing::debug!("Template override: {}", name);
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.iter().map(|(n, c)| (n.as_str(), c.as_str())))
        .map_err(|e| ThemeError::TemplateError(format!("Failed to load templates: {}", e)))?;
    Ok(tera)
}

/// Collect `.html` files under `current_path`, named relative to `base_path`
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<()> {
    for entry in fs::read_dir(current_path).map_err(ThemeError::from)? {
        let path = entry.map_err(ThemeError::from)?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;
            let template_name = relative_path.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(&path).map_err(ThemeError::from)?;
            templates.push((template_name, content));
        }
    }
    Ok(())
}
