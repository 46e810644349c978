//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup, in-memory document builders, and lookup helpers
//! that work with scan and generate data structures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let docs = scan(tmp.path(), &ContentConfig::default()).unwrap();
//!
//! let doc = find_document(&docs, "rust-static-sites");
//! assert_eq!(doc.frontmatter.title, "Static sites in Rust");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::metadata;
use crate::scan::{ContentSource, Order, ScanError, sort_newest_first};
use crate::types::{ContentDocument, Frontmatter, Route, RouteTable};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write an article with the given frontmatter lines and body.
pub fn write_article(root: &Path, name: &str, frontmatter: &str, body: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, format!("---\n{frontmatter}\n---\n{body}\n")).unwrap();
}

// =========================================================================
// In-memory documents
// =========================================================================

/// A minimal document at `path`, created at `created` (any format
/// [`metadata::parse_timestamp`] accepts).
pub fn document(path: &str, created: &str) -> ContentDocument {
    document_from(&format!("{path}.md"), path, created)
}

/// Like [`document`], with an explicit source path.
pub fn document_from(source_path: &str, path: &str, created: &str) -> ContentDocument {
    let created_dt = metadata::parse_timestamp(created)
        .unwrap_or_else(|| panic!("bad test timestamp {created:?}"));
    let rendered = metadata::render_body(&format!("## {path}\n\nBody of {path}."), 3);
    ContentDocument {
        id: format!("id-{source_path}"),
        source_path: source_path.to_string(),
        frontmatter: Frontmatter {
            title: format!("Title {path}"),
            description: None,
            path: path.to_string(),
            redirect_from: None,
            created_at: metadata::format_timestamp(&created_dt, "%-d %B %Y %H:%M"),
            updated_at: None,
        },
        created: created_dt,
        time_to_read: metadata::time_to_read(&rendered.plain_text, 265),
        excerpt: metadata::excerpt(&rendered.plain_text, 140),
        body: rendered.html,
        table_of_contents: rendered.table_of_contents,
    }
}

/// `n` documents one day apart, newest first, paths `post-0` (newest) onward.
pub fn documents_newest_first(n: usize) -> Vec<ContentDocument> {
    let base = metadata::parse_timestamp("2020-01-01").unwrap();
    let mut docs: Vec<ContentDocument> = (0..n)
        .map(|i| {
            let created = base + chrono::Duration::days((n - i) as i64);
            let mut doc = document(&format!("post-{i}"), "2020-01-01");
            doc.created = created;
            doc.frontmatter.created_at = metadata::format_timestamp(&created, "%-d %B %Y %H:%M");
            doc
        })
        .collect();
    sort_newest_first(&mut docs);
    docs
}

/// A [`ContentSource`] over a fixed set of documents.
pub struct StaticSource(pub Vec<ContentDocument>);

impl ContentSource for StaticSource {
    fn query(&self, order: Order) -> Result<Vec<ContentDocument>, ScanError> {
        let mut docs = self.0.clone();
        if order == Order::CreatedDesc {
            sort_newest_first(&mut docs);
        }
        Ok(docs)
    }
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a document by frontmatter path. Panics if not found.
pub fn find_document<'a>(docs: &'a [ContentDocument], path: &str) -> &'a ContentDocument {
    docs.iter()
        .find(|d| d.frontmatter.path == path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = docs.iter().map(|d| d.frontmatter.path.as_str()).collect();
            panic!("document '{path}' not found. Available: {paths:?}")
        })
}

/// Find a route by URL path. Panics if not found.
pub fn find_route<'a>(table: &'a RouteTable, path: &str) -> &'a Route {
    table
        .routes
        .iter()
        .find(|r| r.path == path)
        .unwrap_or_else(|| {
            let paths = route_paths(table);
            panic!("route '{path}' not found. Available: {paths:?}")
        })
}

/// All route paths in table order.
pub fn route_paths(table: &RouteTable) -> Vec<&str> {
    table.routes.iter().map(|r| r.path.as_str()).collect()
}

/// All redirects as `(from, to)` pairs in table order.
pub fn redirect_pairs(table: &RouteTable) -> Vec<(&str, &str)> {
    table
        .redirects
        .iter()
        .map(|r| (r.from_path.as_str(), r.to_path.as_str()))
        .collect()
}
