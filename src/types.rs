//! Shared types passed between the content source, the planners, and the
//! writers.
//!
//! Documents are immutable once loaded. Routes and redirect rules are built
//! once by the emitters and never mutated afterwards; the route table is the
//! only thing the generator writes to disk.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One article loaded from the content directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDocument {
    /// Stable identifier (SHA-256 of the source path relative to the content root).
    pub id: String,
    /// Source file relative to the content root, `/`-separated.
    pub source_path: String,
    pub frontmatter: Frontmatter,
    /// Parsed creation time. Sort key for the listing query.
    ///
    /// Wall-clock time as written: an RFC 3339 offset is dropped, so two
    /// articles with different offsets sort by local time, not by instant.
    pub created: NaiveDateTime,
    /// Body rendered to HTML.
    pub body: String,
    pub table_of_contents: TableOfContents,
    /// Estimated reading time in whole minutes, at least 1.
    pub time_to_read: u32,
    /// Plain-text excerpt of the body.
    pub excerpt: String,
}

/// Author-supplied metadata, with timestamps already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    pub title: String,
    pub description: Option<String>,
    /// Canonical path segment under the blog namespace. Never empty.
    pub path: String,
    pub redirect_from: Option<RedirectAliases>,
    pub created_at: String,
    /// `None` when the author did not set one.
    pub updated_at: Option<String>,
}

/// The `redirect_from` frontmatter value.
///
/// Anything that is not a list of strings is kept as [`RedirectAliases::Malformed`]
/// so the redirect planner can reject it with the document's name attached.
#[derive(Debug, Clone, PartialEq)]
pub enum RedirectAliases {
    Paths(Vec<String>),
    /// Human-readable description of what was found instead of a list.
    Malformed(String),
}

/// Nested heading outline of an article.
///
/// Serializes to `{}` when the article has no headings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOfContents {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Anchor link, e.g. `#getting-started`.
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TocEntry>,
}

/// A page the renderer materializes: path, template, and the data bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub template: String,
    pub context: serde_json::Map<String, serde_json::Value>,
}

/// A redirect handed to the hosting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    pub from_path: String,
    pub to_path: String,
    pub redirect_in_browser: bool,
    pub is_permanent: bool,
}

impl RedirectRule {
    /// A permanent redirect that also works client-side.
    pub fn permanent(from_path: impl Into<String>, to_path: impl Into<String>) -> Self {
        Self {
            from_path: from_path.into(),
            to_path: to_path.into(),
            redirect_in_browser: true,
            is_permanent: true,
        }
    }
}

/// Everything one build produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    pub routes: Vec<Route>,
    pub redirects: Vec<RedirectRule>,
}
