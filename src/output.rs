//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each article is shown by its position and title first, with its source
//! file and derived fields as indented context lines. The output reads as a
//! content inventory but every entry can still be traced to a file.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Articles
//! 001 Typed configs
//!     Source: 2021/typed-configs.md
//!     Path: typed-configs
//!     Created: 20 August 2021 00:00
//!     1 min read
//! 002 Static sites in Rust
//!     Source: 2021/rust-static-sites.mdx
//!     Path: rust-static-sites
//!     Created: 4 March 2021 14:05
//!     Redirects from: static-sites, ssg-in-rust
//!     1 min read
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Plan
//!
//! ```text
//! Articles
//! 001 Typed configs → /blog/typed-configs (page 1)
//!
//! Listings
//! 001 /blog (skip 0, limit 2)
//! 002 /blog/2 (skip 2, limit 2)
//!
//! Redirects
//!     /blog/static-sites → /blog/rust-static-sites (301)
//!     /blog/1 → /blog (301)
//!
//! Planned 4 articles, 2 listing pages, 3 redirects
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::Build;
use crate::types::{ContentDocument, RedirectAliases, RedirectRule, Route};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

fn redirect_line(rule: &RedirectRule) -> String {
    let status = if rule.is_permanent { 301 } else { 302 };
    format!("{}{} → {} ({})", indent(1), rule.from_path, rule.to_path, status)
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the scanned article collection, newest first.
pub fn format_scan_output(docs: &[ContentDocument], source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Articles".to_string());
    if docs.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, doc) in docs.iter().enumerate() {
        let fm = &doc.frontmatter;
        lines.push(format!("{} {}", format_index(i + 1), fm.title));
        lines.push(format!("{}Source: {}", indent(1), doc.source_path));
        lines.push(format!("{}Path: {}", indent(1), fm.path));
        lines.push(format!("{}Created: {}", indent(1), fm.created_at));
        if let Some(updated) = &fm.updated_at {
            lines.push(format!("{}Updated: {}", indent(1), updated));
        }
        if let Some(desc) = &fm.description {
            let truncated = truncate_desc(desc.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("{}{}", indent(1), truncated));
            }
        }
        match &fm.redirect_from {
            Some(RedirectAliases::Paths(paths)) if !paths.is_empty() => {
                lines.push(format!("{}Redirects from: {}", indent(1), paths.join(", ")));
            }
            Some(RedirectAliases::Malformed(found)) => {
                lines.push(format!("{}Redirects from: invalid ({})", indent(1), found));
            }
            _ => {}
        }
        lines.push(format!("{}{} min read", indent(1), doc.time_to_read));
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(docs: &[ContentDocument], source_root: &Path) {
    for line in format_scan_output(docs, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan output
// ============================================================================

fn article_line(index: usize, route: &Route) -> String {
    let title = route.context["frontmatter"]["title"]
        .as_str()
        .unwrap_or(&route.path);
    match route.context["page"].as_u64() {
        Some(page) => format!("{} {} → {} (page {})", format_index(index), title, route.path, page),
        None => format!("{} {} → {}", format_index(index), title, route.path),
    }
}

fn listing_line(index: usize, route: &Route) -> String {
    format!(
        "{} {} (skip {}, limit {})",
        format_index(index),
        route.path,
        route.context["skip"],
        route.context["limit"]
    )
}

/// Format the planned route table: articles, listings, redirects, skips.
pub fn format_plan_output(build: &Build) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Articles".to_string());
    for (i, route) in build.article_routes().iter().enumerate() {
        lines.push(article_line(i + 1, route));
    }

    lines.push(String::new());
    lines.push("Listings".to_string());
    for (i, route) in build.listing_routes().iter().enumerate() {
        lines.push(listing_line(i + 1, route));
    }

    lines.push(String::new());
    lines.push("Redirects".to_string());
    for rule in &build.table.redirects {
        lines.push(redirect_line(rule));
    }

    if !build.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &build.skipped {
            lines.push(format!("{}{}", indent(1), skipped.source_path));
            lines.push(format!("{}{}", indent(2), skipped.reason));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Planned {}, {}, {}",
        plural(build.article_count, "article", "articles"),
        plural(build.listing_routes().len(), "listing page", "listing pages"),
        plural(build.table.redirects.len(), "redirect", "redirects"),
    ));
    lines
}

/// Print plan output to stdout.
pub fn print_plan_output(build: &Build) {
    for line in format_plan_output(build) {
        println!("{}", line);
    }
}

// ============================================================================
// Write output
// ============================================================================

/// Format the list of written files, relative to the output directory.
pub fn format_write_output(written: &[PathBuf], output_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Wrote".to_string()];
    for path in written {
        let shown = path.strip_prefix(output_dir).unwrap_or(path);
        lines.push(format!("{}{}", indent(1), shown.display()));
    }
    lines
}

/// Print write output to stdout.
pub fn print_write_output(written: &[PathBuf], output_dir: &Path) {
    for line in format_write_output(written, output_dir) {
        println!("{}", line);
    }
}
