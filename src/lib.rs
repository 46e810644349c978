//! # Folio
//!
//! Route planning for a markdown blog. Your content directory is the data
//! source: every `.md`/`.mdx` file with frontmatter becomes an article page,
//! the articles are paginated into listing pages, and old paths listed under
//! `redirect_from` become redirects.
//!
//! # Architecture: Query, Plan, Write
//!
//! ```text
//! 1. Query   content/    →  Vec<ContentDocument>   (files → parsed, rendered articles)
//! 2. Plan    documents   →  RouteTable             (articles + listings + redirects)
//! 3. Write   RouteTable  →  dist/                  (routes.json, redirects.json, _redirects)
//! ```
//!
//! Planning never touches the filesystem. It reads from a [`scan::ContentSource`],
//! so tests drive it with in-memory documents.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content directory, parses frontmatter, renders bodies |
//! | [`metadata`] | Markdown rendering, table of contents, excerpt, reading time, dates |
//! | [`pagination`] | Listing page count and per-page skip/limit |
//! | [`redirects`] | Alias redirects from `redirect_from` |
//! | [`routes`] | Article and listing route emitters |
//! | [`generate`] | Runs both passes, validates the table, writes outputs |
//! | [`config`] | `config.toml` loading, validation, and stock defaults |
//! | [`types`] | Documents, routes, and redirect rules |
//! | [`naming`] | URL joining and heading slugs |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Query, Two Passes
//!
//! The collection is queried once, newest first, and shared by the article
//! pass and the listing pass. An article's `page` number is therefore exactly
//! the listing page it appears on.
//!
//! ## Validate Before Writing
//!
//! Route paths that collide, redirects that would shadow a page, and
//! redirects that point at themselves are build errors. Nothing is written
//! until the whole table is known to be consistent.

pub mod config;
pub mod generate;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pagination;
pub mod redirects;
pub mod routes;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
