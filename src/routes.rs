//! Route emitters: one detail page per article, one listing page per
//! pagination window.
//!
//! ## Article Routes
//!
//! `<base>/<path>` bound to the article template. The context carries the
//! whole rendered payload so the template never has to look anything up:
//!
//! ```text
//! id, body, tableOfContents, timeToRead, excerpt,
//! frontmatter { title, description, path, redirect_from, created_at, updated_at },
//! page   ← listing page (1-based) the article appears on
//! ```
//!
//! `updated_at` falls back to `created_at`, so templates never see a missing
//! update time.
//!
//! ## Listing Routes
//!
//! `<base>` for the first page, `<base>/2`, `<base>/3`, ... after that, bound to
//! the listing template with `{limit, skip, numPages, currentPage}`. The first
//! page is also reachable as `<base>/1`, so the listing pass always emits one
//! `<base>/1 → <base>` redirect, even when there are no articles.
//!
//! The listing pass requires its input newest first. That order is checked,
//! not restored: an out-of-order collection means the content query broke
//! its contract, and re-sorting here would hide that.

use crate::config::{ConfigError, SiteConfig};
use crate::naming::{join_url, listing_path};
use crate::pagination::{self, PaginationPlan};
use crate::types::{ContentDocument, Frontmatter, RedirectAliases, RedirectRule, Route};
use chrono::NaiveDateTime;
use serde_json::{Map, Value, json};
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ListingError {
    #[error(
        "articles must be ordered newest first, but {earlier} ({earlier_created}) comes before {later} ({later_created})"
    )]
    Unsorted {
        earlier: String,
        earlier_created: NaiveDateTime,
        later: String,
        later_created: NaiveDateTime,
    },
}

/// Route-shaping settings resolved from the site config.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSettings {
    pub base_path: String,
    pub page_size: NonZeroUsize,
    pub article_template: String,
    pub listing_template: String,
}

impl RouteSettings {
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        let page_size = NonZeroUsize::new(config.blog.page_size).ok_or_else(|| {
            ConfigError::Validation("blog.page_size must be at least 1".into())
        })?;
        Ok(Self {
            base_path: config.blog.base_path.clone(),
            page_size,
            article_template: config.templates.article.clone(),
            listing_template: config.templates.listing.clone(),
        })
    }
}

/// Build the detail-page route for the article at `position` in the
/// newest-first collection.
pub fn emit_article(doc: &ContentDocument, position: usize, settings: &RouteSettings) -> Route {
    let mut context = Map::new();
    context.insert("id".into(), Value::from(doc.id.clone()));
    context.insert("body".into(), Value::from(doc.body.clone()));
    context.insert("tableOfContents".into(), json!(doc.table_of_contents));
    context.insert("timeToRead".into(), Value::from(doc.time_to_read));
    context.insert("excerpt".into(), Value::from(doc.excerpt.clone()));
    context.insert("frontmatter".into(), frontmatter_value(&doc.frontmatter));
    context.insert(
        "page".into(),
        Value::from(pagination::owning_page(position, settings.page_size)),
    );

    log::debug!("article route {} ← {}", doc.frontmatter.path, doc.source_path);
    Route {
        path: join_url(&settings.base_path, &doc.frontmatter.path),
        template: settings.article_template.clone(),
        context,
    }
}

fn frontmatter_value(fm: &Frontmatter) -> Value {
    let redirect_from = match &fm.redirect_from {
        Some(RedirectAliases::Paths(paths)) => json!(paths),
        _ => Value::Null,
    };
    json!({
        "title": fm.title,
        "description": fm.description,
        "path": fm.path,
        "redirect_from": redirect_from,
        "created_at": fm.created_at,
        "updated_at": fm.updated_at.as_deref().unwrap_or(&fm.created_at),
    })
}

/// Verify the collection is ordered by creation time, newest first.
///
/// Equal timestamps are allowed in any order.
pub fn check_sorted(documents: &[ContentDocument]) -> Result<(), ListingError> {
    match documents
        .windows(2)
        .find(|pair| pair[0].created < pair[1].created)
    {
        Some(pair) => Err(ListingError::Unsorted {
            earlier: pair[0].source_path.clone(),
            earlier_created: pair[0].created,
            later: pair[1].source_path.clone(),
            later_created: pair[1].created,
        }),
        None => Ok(()),
    }
}

/// Build every listing route plus the first-page canonicalizing redirect.
pub fn emit_listing(
    documents: &[ContentDocument],
    settings: &RouteSettings,
) -> Result<(Vec<Route>, Vec<RedirectRule>), ListingError> {
    check_sorted(documents)?;

    let plan = PaginationPlan::new(documents.len(), settings.page_size);
    let num_pages = plan.num_pages();
    let routes: Vec<Route> = plan
        .pages()
        .map(|(page_index, bounds)| {
            let mut context = Map::new();
            context.insert("limit".into(), Value::from(bounds.limit));
            context.insert("skip".into(), Value::from(bounds.skip));
            context.insert("numPages".into(), Value::from(num_pages));
            context.insert("currentPage".into(), Value::from(page_index + 1));
            Route {
                path: listing_path(&settings.base_path, page_index),
                template: settings.listing_template.clone(),
                context,
            }
        })
        .collect();
    log::debug!(
        "{} listing pages for {} articles",
        routes.len(),
        documents.len()
    );

    let first_page = listing_path(&settings.base_path, 0);
    let canonical = RedirectRule::permanent(join_url(&settings.base_path, "1"), first_page);
    Ok((routes, vec![canonical]))
}
