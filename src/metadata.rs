//! Derived article fields: rendered body, outline, excerpt, reading time,
//! and display timestamps.
//!
//! All of these are computed once per document while scanning, from the
//! Markdown body and the frontmatter strings. Nothing here touches the
//! filesystem.
//!
//! ## Body Rendering
//!
//! One pass over the `pulldown-cmark` event stream does three jobs:
//!
//! - Every heading gets an `id` anchor (an explicit `{#id}` attribute wins,
//!   otherwise a unique slug from [`crate::naming::SlugCounter`]).
//! - Headings up to the configured depth are collected into a nested
//!   [`TableOfContents`].
//! - Text and inline code are accumulated as plain text for the excerpt and
//!   the word count.
//!
//! ## Timestamps
//!
//! Frontmatter dates are accepted as RFC 3339, `YYYY-MM-DD HH:MM[:SS]`
//! (space or `T` separator), or a bare `YYYY-MM-DD` (midnight). They are
//! formatted for display with a chrono format string; the default
//! `%-d %B %Y %H:%M` renders `4 March 2021 14:05`.

use crate::naming::SlugCounter;
use crate::types::{TableOfContents, TocEntry};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::fmt::{self, Write};

/// Output of [`render_body`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBody {
    pub html: String,
    pub table_of_contents: TableOfContents,
    /// Text content with block boundaries turned into spaces.
    pub plain_text: String,
}

/// A heading found while rendering, before nesting.
#[derive(Debug, Clone)]
struct FlatHeading {
    level: usize,
    title: String,
    anchor: String,
}

/// Render Markdown to HTML, anchoring headings and building the outline.
pub fn render_body(markdown: &str, toc_max_depth: u8) -> RenderedBody {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let mut events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let mut slugs = SlugCounter::new();
    let mut headings = Vec::new();
    let mut plain = String::new();
    let mut open_heading: Option<(usize, String)> = None;

    for idx in 0..events.len() {
        let ended_level = match &events[idx] {
            Event::Start(Tag::Heading { .. }) => {
                open_heading = Some((idx, String::new()));
                None
            }
            Event::End(TagEnd::Heading(level)) => Some(*level as usize),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, heading_text)) = open_heading.as_mut() {
                    heading_text.push_str(text);
                }
                plain.push_str(text);
                None
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, heading_text)) = open_heading.as_mut() {
                    heading_text.push(' ');
                }
                plain.push(' ');
                None
            }
            Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock | TagEnd::TableCell) => {
                plain.push(' ');
                None
            }
            _ => None,
        };

        let Some(level) = ended_level else {
            continue;
        };
        plain.push(' ');
        let Some((start, text)) = open_heading.take() else {
            continue;
        };
        let title = text.trim().to_string();
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            let anchor = match id.as_deref() {
                Some(existing) => existing.to_string(),
                None => slugs.slug(&title),
            };
            if id.is_none() {
                *id = Some(CowStr::from(anchor.clone()));
            }
            if level <= toc_max_depth as usize {
                headings.push(FlatHeading {
                    level,
                    title,
                    anchor,
                });
            }
        }
    }

    let mut body_html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body_html, events.into_iter());

    RenderedBody {
        html: body_html,
        table_of_contents: TableOfContents {
            items: nest_headings(&headings),
        },
        plain_text: plain,
    }
}

/// Nest a flat heading list: each heading owns the following headings that
/// are deeper than it, up to the next heading at its level or above.
fn nest_headings(flat: &[FlatHeading]) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut i = 0;
    while i < flat.len() {
        let level = flat[i].level;
        let mut end = i + 1;
        while end < flat.len() && flat[end].level > level {
            end += 1;
        }
        entries.push(TocEntry {
            url: format!("#{}", flat[i].anchor),
            title: flat[i].title.clone(),
            items: nest_headings(&flat[i + 1..end]),
        });
        i = end;
    }
    entries
}

/// Prune plain text to at most `max_chars` characters at a word boundary,
/// appending `…` when anything was cut.
pub fn excerpt(plain: &str, max_chars: usize) -> String {
    let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut = collapsed
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(collapsed.len());
    let head = &collapsed[..cut];
    let head = if collapsed[cut..].starts_with(' ') {
        head
    } else {
        // Mid-word: back off to the previous space
        match head.rfind(' ') {
            Some(pos) => &head[..pos],
            None => head,
        }
    };
    let head = head.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'));
    format!("{}…", head)
}

/// Reading time in whole minutes, rounded half up, never below 1.
pub fn time_to_read(plain: &str, words_per_minute: usize) -> u32 {
    let wpm = words_per_minute.max(1);
    let words = plain.split_whitespace().count();
    let minutes = (words + wpm / 2) / wpm;
    u32::try_from(minutes.max(1)).unwrap_or(u32::MAX)
}

/// Parse a frontmatter timestamp. Returns `None` for unrecognized input.
///
/// RFC 3339 input keeps its local wall-clock time and drops the offset, so
/// `2021-03-04T14:05:00+01:00` and `2021-03-04T14:05:00-05:00` both become
/// `2021-03-04 14:05`. Ordering by the result is ordering by wall clock,
/// not by instant.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a timestamp for display.
///
/// Falls back to [`FALLBACK_DATE_FORMAT`] when `fmt` cannot render a
/// timestamp without an offset. Config validation rejects such formats with
/// [`is_valid_date_format`], so the fallback is only reached by direct
/// callers.
pub fn format_timestamp(dt: &NaiveDateTime, fmt: &str) -> String {
    try_format(dt, fmt).unwrap_or_else(|_| dt.format(FALLBACK_DATE_FORMAT).to_string())
}

pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn try_format(dt: &NaiveDateTime, fmt: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", dt.format(fmt))?;
    Ok(out)
}

/// Whether chrono can render `fmt` for a timestamp without an offset.
///
/// Tokenizing is not enough: `%z` and `%Z` parse fine but fail when
/// applied to a `NaiveDateTime`.
pub fn is_valid_date_format(fmt: &str) -> bool {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    let sample = NaiveDate::from_ymd_opt(2021, 3, 4).and_then(|d| d.and_hms_opt(14, 5, 0));
    sample.is_some_and(|dt| try_format(&dt, fmt).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_get_anchor_ids() {
        let out = render_body("# Hello World\n\nText.", 3);
        assert!(out.html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
    }

    #[test]
    fn explicit_heading_id_is_kept() {
        let out = render_body("## Setup {#install}\n", 3);
        assert!(out.html.contains(r#"id="install""#));
        assert_eq!(out.table_of_contents.items[0].url, "#install");
    }

    #[test]
    fn toc_nests_by_level() {
        let md = "# Intro\n\n## Part A\n\n### Detail\n\n## Part B\n\n# Outro\n";
        let toc = render_body(md, 3).table_of_contents;
        assert_eq!(toc.items.len(), 2);
        assert_eq!(toc.items[0].title, "Intro");
        assert_eq!(toc.items[0].items.len(), 2);
        assert_eq!(toc.items[0].items[0].title, "Part A");
        assert_eq!(toc.items[0].items[0].items[0].url, "#detail");
        assert_eq!(toc.items[0].items[1].title, "Part B");
        assert!(toc.items[0].items[1].items.is_empty());
        assert_eq!(toc.items[1].title, "Outro");
    }

    #[test]
    fn toc_respects_max_depth() {
        let md = "## Two\n\n### Three\n\n#### Four\n";
        let toc = render_body(md, 3).table_of_contents;
        assert_eq!(toc.items[0].items[0].title, "Three");
        assert!(toc.items[0].items[0].items.is_empty());
        // Deep headings still get anchors in the body
        assert!(render_body(md, 3).html.contains(r#"id="four""#));
    }

    #[test]
    fn toc_without_headings_serializes_empty() {
        let toc = render_body("Just text.", 3).table_of_contents;
        assert_eq!(serde_json::to_string(&toc).unwrap(), "{}");
    }

    #[test]
    fn heading_with_inline_code_uses_full_text() {
        let toc = render_body("## Using `cargo`\n", 3).table_of_contents;
        assert_eq!(toc.items[0].title, "Using cargo");
        assert_eq!(toc.items[0].url, "#using-cargo");
    }

    #[test]
    fn plain_text_separates_blocks() {
        let out = render_body("# Title\nFirst para.\n\nSecond *para*.", 3);
        let words: Vec<&str> = out.plain_text.split_whitespace().collect();
        assert_eq!(words, ["Title", "First", "para.", "Second", "para."]);
    }

    #[test]
    fn short_excerpt_is_unchanged() {
        assert_eq!(excerpt("A  short\nline.", 140), "A short line.");
    }

    #[test]
    fn long_excerpt_is_pruned_at_word_boundary() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(excerpt(text, 12), "The quick…");
    }

    #[test]
    fn excerpt_cut_exactly_at_space_keeps_last_word() {
        let text = "The quick brown fox";
        assert_eq!(excerpt(text, 9), "The quick…");
    }

    #[test]
    fn excerpt_trims_trailing_comma() {
        assert_eq!(excerpt("First, second, third", 14), "First, second…");
    }

    #[test]
    fn excerpt_of_single_long_word_is_hard_cut() {
        assert_eq!(excerpt("Supercalifragilistic", 5), "Super…");
    }

    #[test]
    fn time_to_read_is_at_least_one_minute() {
        assert_eq!(time_to_read("", 265), 1);
        assert_eq!(time_to_read("just a few words", 265), 1);
    }

    #[test]
    fn time_to_read_rounds_half_up() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert_eq!(time_to_read(&words(397), 265), 1);
        assert_eq!(time_to_read(&words(398), 265), 2);
        assert_eq!(time_to_read(&words(1060), 265), 4);
    }

    #[test]
    fn parse_rfc3339_timestamp() {
        let dt = parse_timestamp("2021-03-04T14:05:00+01:00").unwrap();
        assert_eq!(format_timestamp(&dt, "%-d %B %Y %H:%M"), "4 March 2021 14:05");
    }

    #[test]
    fn parse_space_separated_timestamp() {
        let dt = parse_timestamp("2020-11-30 09:15").unwrap();
        assert_eq!(format_timestamp(&dt, "%-d %B %Y %H:%M"), "30 November 2020 09:15");
    }

    #[test]
    fn parse_bare_date_is_midnight() {
        let dt = parse_timestamp("2019-01-02").unwrap();
        assert_eq!(format_timestamp(&dt, "%-d %B %Y %H:%M"), "2 January 2019 00:00");
    }

    #[test]
    fn unparsable_timestamp_is_none() {
        assert!(parse_timestamp("last tuesday").is_none());
        assert!(parse_timestamp("2021-13-01").is_none());
    }

    #[test]
    fn date_format_validation() {
        assert!(is_valid_date_format("%-d %B %Y %H:%M"));
        assert!(!is_valid_date_format("%Y %"));
    }

    #[test]
    fn date_format_needing_offset_is_invalid() {
        assert!(!is_valid_date_format("%d %b %Y %z"));
        assert!(!is_valid_date_format("%Z"));
        assert!(is_valid_date_format("%Y-%m-%d"));
    }

    #[test]
    fn format_timestamp_falls_back_instead_of_panicking() {
        let dt = parse_timestamp("2021-03-04 14:05").unwrap();
        assert_eq!(format_timestamp(&dt, "%d %b %Y %z"), "2021-03-04 14:05");
    }

    #[test]
    fn rfc3339_offsets_are_dropped() {
        let east = parse_timestamp("2021-03-04T14:05:00+01:00").unwrap();
        let west = parse_timestamp("2021-03-04T14:05:00-05:00").unwrap();
        assert_eq!(east, west);
    }
}
