//! Route table generation.
//!
//! Takes the article collection from a [`ContentSource`] and produces the
//! complete [`RouteTable`]: article pages, listing pages, and every redirect.
//! Then writes it out for the renderer and the host.
//!
//! ## Build Pass
//!
//! ```text
//! query (once, newest first)
//!   → screen aliases          abort, or skip the document, per config
//!   → ┬ article pass          redirects + one route per article
//!     └ listing pass          listing routes + <base>/1 → <base>
//!   → validate                no duplicate or shadowed paths
//! ```
//!
//! The two passes only read the shared collection, so they run concurrently
//! with `rayon::join`. Their results are appended articles-first, keeping the
//! table identical from run to run.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── routes.json              # [{path, template, context}]
//! ├── redirects.json           # [{fromPath, toPath, redirectInBrowser, isPermanent}]
//! ├── _redirects               # "<from> <to> 301" per rule (optional)
//! └── blog/
//!     ├── 1/index.html         # Refresh page for each browser redirect (optional)
//!     └── old-slug/index.html
//! ```
//!
//! Nothing is written unless the whole table was built and validated.

use crate::config::{self, AliasPolicy, ConfigError, OutputConfig, SiteConfig};
use crate::redirects::{PlanError, plan_redirects, validate_aliases};
use crate::routes::{ListingError, RouteSettings, emit_article, emit_listing};
use crate::scan::{ContentSource, FsContentSource, Order, ScanError};
use crate::types::{ContentDocument, RedirectRule, Route, RouteTable};
use maud::{DOCTYPE, Markup, html};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Content query failed: {0}")]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Plan(#[from] PlanError),
    #[error("{0}")]
    Listing(#[from] ListingError),
    #[error("Two pages share the path {0}")]
    DuplicateRoute(String),
    #[error("Two redirects start at {0}")]
    DuplicateRedirect(String),
    #[error("Redirect from {0} would shadow the page at the same path")]
    RedirectShadowsRoute(String),
    #[error("Redirect from {0} points at itself")]
    SelfRedirect(String),
    #[error("Path {0} must be absolute and must not contain '.' or '..' segments")]
    UnsafePath(String),
}

pub const ROUTES_FILE: &str = "routes.json";
pub const REDIRECTS_FILE: &str = "redirects.json";
pub const HOST_REDIRECTS_FILE: &str = "_redirects";

/// A document left out of the build under [`AliasPolicy::SkipDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub source_path: String,
    pub reason: PlanError,
}

/// Result of one build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    pub table: RouteTable,
    /// The first `article_count` routes are article pages; the rest are listings.
    pub article_count: usize,
    pub skipped: Vec<SkippedDocument>,
}

impl Build {
    pub fn article_routes(&self) -> &[Route] {
        &self.table.routes[..self.article_count]
    }

    pub fn listing_routes(&self) -> &[Route] {
        &self.table.routes[self.article_count..]
    }
}

/// Load config and content from `source_dir`, build the table, and write it
/// to `output_dir`.
pub fn generate(source_dir: &Path, output_dir: &Path) -> Result<(Build, Vec<PathBuf>), GenerateError> {
    let config = config::load_config(source_dir)?;
    let source = FsContentSource::new(source_dir, config.content.clone());
    let build = plan_site(&source, &config)?;
    let written = write_build(&build.table, output_dir, &config.output)?;
    Ok((build, written))
}

/// Query the content source once and build the validated route table.
pub fn plan_site<S: ContentSource + ?Sized>(
    source: &S,
    config: &SiteConfig,
) -> Result<Build, GenerateError> {
    let settings = RouteSettings::from_config(config)?;
    let docs = source.query(Order::CreatedDesc)?;
    log::info!("planning routes for {} articles", docs.len());

    let (docs, skipped) = screen_documents(docs, config.blog.on_malformed_aliases)?;

    let (articles, listing) = rayon::join(
        || article_pass(&docs, &settings),
        || emit_listing(&docs, &settings),
    );
    let (article_routes, alias_redirects) = articles?;
    let (listing_routes, listing_redirects) = listing?;

    let article_count = article_routes.len();
    let mut table = RouteTable::default();
    table.routes.extend(article_routes);
    table.routes.extend(listing_routes);
    table.redirects.extend(alias_redirects);
    table.redirects.extend(listing_redirects);

    validate_table(&table)?;
    log::info!(
        "planned {} routes and {} redirects",
        table.routes.len(),
        table.redirects.len()
    );
    Ok(Build {
        table,
        article_count,
        skipped,
    })
}

/// Apply the alias policy before any route is emitted.
fn screen_documents(
    docs: Vec<ContentDocument>,
    policy: AliasPolicy,
) -> Result<(Vec<ContentDocument>, Vec<SkippedDocument>), PlanError> {
    let mut kept = Vec::with_capacity(docs.len());
    let mut skipped = Vec::new();
    for doc in docs {
        match validate_aliases(&doc) {
            Ok(()) => kept.push(doc),
            Err(err) if policy == AliasPolicy::SkipDocument => {
                log::warn!("skipping {}: {}", doc.source_path, err);
                skipped.push(SkippedDocument {
                    source_path: doc.source_path,
                    reason: err,
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok((kept, skipped))
}

fn article_pass(
    docs: &[ContentDocument],
    settings: &RouteSettings,
) -> Result<(Vec<Route>, Vec<RedirectRule>), PlanError> {
    let mut routes = Vec::with_capacity(docs.len());
    let mut redirects = Vec::new();
    for (position, doc) in docs.iter().enumerate() {
        redirects.extend(plan_redirects(doc, &settings.base_path)?);
        routes.push(emit_article(doc, position, settings));
    }
    Ok((routes, redirects))
}

/// Reject tables the host could not serve unambiguously.
pub fn validate_table(table: &RouteTable) -> Result<(), GenerateError> {
    let mut route_paths = HashSet::new();
    for route in &table.routes {
        check_path(&route.path)?;
        if !route_paths.insert(route.path.as_str()) {
            return Err(GenerateError::DuplicateRoute(route.path.clone()));
        }
    }

    let mut sources = HashSet::new();
    for rule in &table.redirects {
        check_path(&rule.from_path)?;
        if rule.from_path == rule.to_path {
            return Err(GenerateError::SelfRedirect(rule.from_path.clone()));
        }
        if route_paths.contains(rule.from_path.as_str()) {
            return Err(GenerateError::RedirectShadowsRoute(rule.from_path.clone()));
        }
        if !sources.insert(rule.from_path.as_str()) {
            return Err(GenerateError::DuplicateRedirect(rule.from_path.clone()));
        }
    }
    Ok(())
}

fn check_path(path: &str) -> Result<(), GenerateError> {
    let dotted = path.split('/').any(|seg| seg == "." || seg == "..");
    if !path.starts_with('/') || dotted {
        return Err(GenerateError::UnsafePath(path.to_string()));
    }
    Ok(())
}

/// Write the route table and hosting artifacts. Returns the files written.
pub fn write_build(
    table: &RouteTable,
    output_dir: &Path,
    output: &OutputConfig,
) -> Result<Vec<PathBuf>, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let routes_path = output_dir.join(ROUTES_FILE);
    fs::write(&routes_path, serde_json::to_string_pretty(&table.routes)?)?;
    written.push(routes_path);

    let redirects_path = output_dir.join(REDIRECTS_FILE);
    fs::write(&redirects_path, serde_json::to_string_pretty(&table.redirects)?)?;
    written.push(redirects_path);

    if output.redirects_file {
        let host_path = output_dir.join(HOST_REDIRECTS_FILE);
        fs::write(&host_path, render_redirects_file(&table.redirects))?;
        written.push(host_path);
    }

    if output.redirect_pages {
        for rule in table.redirects.iter().filter(|r| r.redirect_in_browser) {
            let dir = output_dir.join(rule.from_path.trim_start_matches('/'));
            fs::create_dir_all(&dir)?;
            let page_path = dir.join("index.html");
            fs::write(&page_path, render_redirect_page(rule).into_string())?;
            written.push(page_path);
        }
    }

    log::info!("wrote {} files to {}", written.len(), output_dir.display());
    Ok(written)
}

/// One `<from> <to> <status>` line per rule.
pub fn render_redirects_file(redirects: &[RedirectRule]) -> String {
    let mut out = String::new();
    for rule in redirects {
        let status = if rule.is_permanent { 301 } else { 302 };
        out.push_str(&format!("{} {} {}\n", rule.from_path, rule.to_path, status));
    }
    out
}

/// Static page that sends the browser on to the rule's target.
pub fn render_redirect_page(rule: &RedirectRule) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Redirecting…" }
                link rel="canonical" href=(rule.to_path);
                meta http-equiv="refresh" content={ "0; url=" (rule.to_path) };
                meta name="robots" content="noindex";
            }
            body {
                p {
                    "This page has moved to "
                    a href=(rule.to_path) { (rule.to_path) }
                    "."
                }
            }
        }
    }
}
