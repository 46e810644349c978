//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the content root overrides them key by
//! key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [blog]
//! base_path = "/blog"             # URL namespace for articles and listings
//! page_size = 16                  # Articles per listing page
//! on_malformed_aliases = "abort"  # or "skip-document"
//!
//! [templates]
//! article = "blog-article/BlogPageTemplate"
//! listing = "blog-article/BlogArticlesList"
//!
//! [content]
//! toc_max_depth = 3               # Deepest heading level in the outline
//! excerpt_length = 140            # Characters before the excerpt is pruned
//! words_per_minute = 265          # Reading speed for time-to-read
//! date_format = "%-d %B %Y %H:%M" # chrono format for display timestamps
//!
//! [output]
//! redirects_file = true           # Write a `_redirects` table
//! redirect_pages = true           # Write HTML refresh stubs for browser redirects
//!
//! [processing]
//! max_processes = 4               # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [blog]
//! page_size = 10
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::metadata;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Blog namespace, pagination and alias policy.
    pub blog: BlogConfig,
    /// Template identifiers bound into routes.
    pub templates: TemplatesConfig,
    /// Derived-content settings (outline, excerpt, read time, dates).
    pub content: ContentConfig,
    /// Hosting artifacts written next to the route tables.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blog.page_size == 0 {
            return Err(ConfigError::Validation(
                "blog.page_size must be at least 1".into(),
            ));
        }
        if !self.blog.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "blog.base_path must start with '/'".into(),
            ));
        }
        if self.blog.base_path.len() > 1 && self.blog.base_path.ends_with('/') {
            return Err(ConfigError::Validation(
                "blog.base_path must not end with '/'".into(),
            ));
        }
        if self.templates.article.trim().is_empty() || self.templates.listing.trim().is_empty() {
            return Err(ConfigError::Validation(
                "templates.article and templates.listing must not be empty".into(),
            ));
        }
        if !(1..=6).contains(&self.content.toc_max_depth) {
            return Err(ConfigError::Validation(
                "content.toc_max_depth must be 1-6".into(),
            ));
        }
        if self.content.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "content.words_per_minute must be at least 1".into(),
            ));
        }
        if !metadata::is_valid_date_format(&self.content.date_format) {
            return Err(ConfigError::Validation(format!(
                "content.date_format is not a valid chrono format: {:?}",
                self.content.date_format
            )));
        }
        Ok(())
    }
}

/// What to do with a document whose `redirect_from` is not a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasPolicy {
    /// Fail the whole build.
    #[default]
    Abort,
    /// Drop the document (no route, no redirects) and keep going.
    SkipDocument,
}

/// Blog namespace and pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// URL prefix shared by articles and listing pages, e.g. `/blog`.
    pub base_path: String,
    /// Number of articles on each listing page.
    pub page_size: usize,
    /// Handling of malformed `redirect_from` frontmatter.
    pub on_malformed_aliases: AliasPolicy,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            base_path: "/blog".to_string(),
            page_size: 16,
            on_malformed_aliases: AliasPolicy::Abort,
        }
    }
}

/// Template identifiers the external renderer resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Template for a single article page.
    pub article: String,
    /// Template for a paginated listing page.
    pub listing: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            article: "blog-article/BlogPageTemplate".to_string(),
            listing: "blog-article/BlogArticlesList".to_string(),
        }
    }
}

/// Settings for the fields derived from each article body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Deepest heading level included in the table of contents.
    pub toc_max_depth: u8,
    /// Maximum excerpt length in characters, before the ellipsis.
    pub excerpt_length: usize,
    /// Reading speed used for `timeToRead`.
    pub words_per_minute: usize,
    /// chrono format string for `created_at`/`updated_at` display values.
    pub date_format: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            toc_max_depth: 3,
            excerpt_length: 140,
            words_per_minute: 265,
            date_format: "%-d %B %Y %H:%M".to_string(),
        }
    }
}

/// Hosting artifacts written alongside `routes.json` and `redirects.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Write a `_redirects` file (one `from to status` line per rule).
    pub redirects_file: bool,
    /// Write `<from>/index.html` refresh pages for browser redirects.
    pub redirect_pages: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            redirects_file: true,
            redirect_pages: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    log::debug!(
        "config: base_path={} page_size={}",
        config.blog.base_path,
        config.blog.page_size
    );
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the content root. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Blog routes
# ---------------------------------------------------------------------------
[blog]
# URL namespace for articles (/blog/<path>) and listings (/blog, /blog/2, ...).
base_path = "/blog"

# Articles per listing page.
page_size = 16

# What to do when an article's `redirect_from` is not a list:
#   "abort"          fail the build (catches authoring mistakes early)
#   "skip-document"  leave that article out of the build and warn
on_malformed_aliases = "abort"

# ---------------------------------------------------------------------------
# Template identifiers handed to the renderer
# ---------------------------------------------------------------------------
[templates]
article = "blog-article/BlogPageTemplate"
listing = "blog-article/BlogArticlesList"

# ---------------------------------------------------------------------------
# Derived article content
# ---------------------------------------------------------------------------
[content]
# Deepest heading level (1-6) included in the table of contents.
toc_max_depth = 3

# Excerpt length in characters. Pruned at a word boundary, then "…" appended.
excerpt_length = 140

# Reading speed for timeToRead (minutes, rounded, at least 1).
words_per_minute = 265

# chrono format for the created_at/updated_at display strings.
# The default renders "4 March 2021 14:05".
date_format = "%-d %B %Y %H:%M"

# ---------------------------------------------------------------------------
# Hosting artifacts
# ---------------------------------------------------------------------------
[output]
# Write a _redirects file: "<from> <to> 301" (302 for non-permanent rules).
redirects_file = true

# Write <from>/index.html refresh pages for browser redirects.
redirect_pages = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit for auto (= number of CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_blog_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.blog.base_path, "/blog");
        assert_eq!(config.blog.page_size, 16);
        assert_eq!(config.blog.on_malformed_aliases, AliasPolicy::Abort);
    }

    #[test]
    fn default_config_has_content_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.content.toc_max_depth, 3);
        assert_eq!(config.content.excerpt_length, 140);
        assert_eq!(config.content.words_per_minute, 265);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[blog]
page_size = 10
"#;
        let base = stock_defaults_value().unwrap();
        let config = resolve_config(base, Some(toml::from_str(toml).unwrap())).unwrap();
        assert_eq!(config.blog.page_size, 10);
        // Unspecified values keep their defaults
        assert_eq!(config.blog.base_path, "/blog");
        assert_eq!(config.templates.article, "blog-article/BlogPageTemplate");
    }

    #[test]
    fn parse_alias_policy_kebab_case() {
        let toml = r#"
[blog]
on_malformed_aliases = "skip-document"
"#;
        let base = stock_defaults_value().unwrap();
        let config = resolve_config(base, Some(toml::from_str(toml).unwrap())).unwrap();
        assert_eq!(config.blog.on_malformed_aliases, AliasPolicy::SkipDocument);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let toml = r#"
[blog]
page_size = 0
"#;
        let base = stock_defaults_value().unwrap();
        let err = resolve_config(base, Some(toml::from_str(toml).unwrap())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn base_path_must_be_rooted() {
        let mut config = SiteConfig::default();
        config.blog.base_path = "blog".into();
        assert!(config.validate().is_err());
        config.blog.base_path = "/blog/".into();
        assert!(config.validate().is_err());
        config.blog.base_path = "/writing".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toc_depth_out_of_range_is_rejected() {
        let mut config = SiteConfig::default();
        config.content.toc_max_depth = 0;
        assert!(config.validate().is_err());
        config.content.toc_max_depth = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_date_format_is_rejected() {
        let mut config = SiteConfig::default();
        config.content.date_format = "%Y %".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn offset_date_format_is_rejected() {
        let mut config = SiteConfig::default();
        for fmt in ["%d %b %Y %z", "%d %b %Y %Z"] {
            config.content.date_format = fmt.into();
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{fmt:?} should be rejected"
            );
        }
    }

    #[test]
    fn offset_date_format_in_file_fails_load() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[content]\ndate_format = \"%d %b %Y %z\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_template_is_rejected() {
        let mut config = SiteConfig::default();
        config.templates.listing = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[blog]
page_sise = 10
"#;
        let base = stock_defaults_value().unwrap();
        assert!(resolve_config(base, Some(toml::from_str(toml).unwrap())).is_err());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.blog.page_size, 16);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[blog]
base_path = "/writing"

[content]
excerpt_length = 80
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.blog.base_path, "/writing");
        assert_eq!(config.content.excerpt_length, 80);
        assert_eq!(config.content.words_per_minute, 265);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value().unwrap(), Some(value)).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.blog.page_size, defaults.blog.page_size);
        assert_eq!(config.content.date_format, defaults.content.date_format);
        assert_eq!(config.templates.listing, defaults.templates.listing);
    }

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig { max_processes: None };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99_999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 5\nz = 6").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(5));
        assert_eq!(merged["t"]["z"].as_integer(), Some(6));
    }
}
