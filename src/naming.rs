//! URL and anchor naming shared by the content source and the emitters.
//!
//! ## Blog Paths
//!
//! Every article and listing lives under the configured base path. Path
//! segments from frontmatter are joined without doubling slashes:
//!
//! - `("/blog", "new-slug")` → `/blog/new-slug`
//! - `("/blog", "/new-slug/")` → `/blog/new-slug`
//! - `("/", "new-slug")` → `/new-slug`
//!
//! ## Heading Anchors
//!
//! Headings get GitHub-style slugs: lowercased, punctuation dropped, spaces
//! turned into dashes. Repeated slugs within one document get `-1`, `-2`, ...
//! suffixes so every anchor is unique.

use std::collections::HashMap;

/// Join a base path and a path segment into an absolute URL path.
pub fn join_url(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_matches('/');
    if segment.is_empty() {
        if base.is_empty() {
            return "/".to_string();
        }
        return base.to_string();
    }
    format!("{}/{}", base, segment)
}

/// Path of a listing page. Index 0 is the bare base path; later pages are
/// numbered from 2.
pub fn listing_path(base: &str, page_index: usize) -> String {
    if page_index == 0 {
        join_url(base, "")
    } else {
        join_url(base, &(page_index + 1).to_string())
    }
}

/// Slug a heading's text into an anchor id.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    slug
}

/// Hands out unique heading slugs within one document.
#[derive(Debug, Default)]
pub struct SlugCounter {
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug `text`, suffixing `-N` if the slug was already handed out.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        if !self.seen.contains_key(&base) {
            self.seen.insert(base.clone(), 0);
            return base;
        }
        loop {
            let n = {
                let count = self.seen.entry(base.clone()).or_insert(0);
                *count += 1;
                *count
            };
            let candidate = format!("{}-{}", base, n);
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}
