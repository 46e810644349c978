//! Content source: articles on disk.
//!
//! Walks the content directory for `.md` and `.mdx` files, splits the YAML
//! frontmatter from the body, and produces one [`ContentDocument`] per file
//! with every derived field (rendered body, outline, excerpt, reading time,
//! display timestamps) filled in.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                  # Site configuration (optional)
//! ├── 2021/
//! │   ├── hello-world.mdx          # Any depth; the URL comes from frontmatter
//! │   └── recap.md
//! └── drafts-notes.md
//! ```
//!
//! ## Frontmatter
//!
//! ```yaml
//! ---
//! title: Hello world          # required
//! description: First post     # optional
//! path: hello-world           # required, non-empty; URL is <base>/<path>
//! redirect_from:              # optional, must be a list
//!   - hello
//! created_at: 2021-03-04 14:05  # required
//! updated_at: 2021-03-05        # optional
//! ---
//! ```
//!
//! Other keys are ignored. A falsy `redirect_from` (empty, `null`, `""`,
//! `false`, `0`) counts as absent; any other non-list value is kept as
//! [`RedirectAliases::Malformed`] for the redirect planner to reject.
//!
//! ## Errors
//!
//! A scan either returns every document or fails. Per-file problems are
//! collected across the whole directory and reported together in
//! [`ScanError::Documents`], so one run shows every broken file.

use crate::config::ContentConfig;
use crate::metadata;
use crate::types::{ContentDocument, Frontmatter, RedirectAliases};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content root not found: {0}")]
    MissingRoot(PathBuf),
    #[error("{}", DocumentErrors(.0))]
    Documents(Vec<DocumentError>),
}

/// A problem with one content file.
#[derive(Error, Debug)]
#[error("{path}: {kind}")]
pub struct DocumentError {
    pub path: PathBuf,
    pub kind: DocumentErrorKind,
}

#[derive(Error, Debug)]
pub enum DocumentErrorKind {
    #[error("cannot read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("no frontmatter block (expected a leading `---` section)")]
    MissingFrontmatter,
    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frontmatter field `{0}` is required")]
    MissingField(&'static str),
    #[error("frontmatter `path` must not be empty")]
    EmptyPath,
    #[error("frontmatter `{field}` is not a recognized timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
}

struct DocumentErrors<'a>(&'a [DocumentError]);

impl fmt::Display for DocumentErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} content file(s) failed to load", self.0.len())?;
        for err in self.0 {
            write!(f, "\n  {}", err)?;
        }
        Ok(())
    }
}

/// Order in which a query returns documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Source path order.
    Unordered,
    /// Newest `created_at` first; ties broken by source path.
    CreatedDesc,
}

/// Something that can hand over the full article collection.
///
/// Implementations must return either every document or an error; there is
/// no partial result.
pub trait ContentSource {
    fn query(&self, order: Order) -> Result<Vec<ContentDocument>, ScanError>;
}

/// [`ContentSource`] backed by a content directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
    content: ContentConfig,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>, content: ContentConfig) -> Self {
        Self {
            root: root.into(),
            content,
        }
    }
}

impl ContentSource for FsContentSource {
    fn query(&self, order: Order) -> Result<Vec<ContentDocument>, ScanError> {
        let mut docs = scan(&self.root, &self.content)?;
        if order == Order::CreatedDesc {
            sort_newest_first(&mut docs);
        }
        Ok(docs)
    }
}

/// Sort newest first, ties by source path so the order is reproducible.
pub fn sort_newest_first(docs: &mut [ContentDocument]) {
    docs.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| a.source_path.cmp(&b.source_path))
    });
}

const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx"];

/// Load every article under `root`, in source path order.
pub fn scan(root: &Path, content: &ContentConfig) -> Result<Vec<ContentDocument>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let files = collect_content_files(root)?;
    log::info!("scanning {} content files in {}", files.len(), root.display());

    let mut docs = Vec::with_capacity(files.len());
    let mut errors = Vec::new();
    for path in files {
        match load_document(root, &path, content) {
            Ok(doc) => {
                log::debug!("loaded {} → {}", doc.source_path, doc.frontmatter.path);
                docs.push(doc);
            }
            Err(kind) => errors.push(DocumentError { path, kind }),
        }
    }

    if !errors.is_empty() {
        return Err(ScanError::Documents(errors));
    }
    Ok(docs)
}

fn collect_content_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        // Skip hidden files and directories (but not the root itself)
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_content_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.as_str()))
}

/// Frontmatter as written by the author, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontmatter {
    title: Option<String>,
    description: Option<String>,
    path: Option<String>,
    redirect_from: Option<serde_yaml::Value>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn load_document(
    root: &Path,
    path: &Path,
    content: &ContentConfig,
) -> Result<ContentDocument, DocumentErrorKind> {
    let source = fs::read_to_string(path)?;
    let (yaml, body) = split_frontmatter(&source).ok_or(DocumentErrorKind::MissingFrontmatter)?;
    let raw: RawFrontmatter = if yaml.trim().is_empty() {
        RawFrontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    let title = raw.title.ok_or(DocumentErrorKind::MissingField("title"))?;
    let url_path = raw.path.ok_or(DocumentErrorKind::MissingField("path"))?;
    if url_path.trim().trim_matches('/').is_empty() {
        return Err(DocumentErrorKind::EmptyPath);
    }
    let created_raw = raw
        .created_at
        .ok_or(DocumentErrorKind::MissingField("created_at"))?;
    let created = parse_field("created_at", &created_raw)?;
    // An empty `updated_at` is the same as leaving it out
    let updated = raw
        .updated_at
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_field("updated_at", value))
        .transpose()?;

    let is_mdx = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("mdx"));
    let markdown = if is_mdx {
        strip_mdx_statements(body)
    } else {
        body.to_string()
    };
    let rendered = metadata::render_body(&markdown, content.toc_max_depth);

    let source_path = relative_source_path(root, path);
    Ok(ContentDocument {
        id: document_id(&source_path),
        frontmatter: Frontmatter {
            title,
            description: raw.description,
            path: url_path,
            redirect_from: raw.redirect_from.and_then(classify_aliases),
            created_at: metadata::format_timestamp(&created, &content.date_format),
            updated_at: updated.map(|dt| metadata::format_timestamp(&dt, &content.date_format)),
        },
        source_path,
        created,
        time_to_read: metadata::time_to_read(&rendered.plain_text, content.words_per_minute),
        excerpt: metadata::excerpt(&rendered.plain_text, content.excerpt_length),
        body: rendered.html,
        table_of_contents: rendered.table_of_contents,
    })
}

fn parse_field(
    field: &'static str,
    value: &str,
) -> Result<chrono::NaiveDateTime, DocumentErrorKind> {
    metadata::parse_timestamp(value).ok_or_else(|| DocumentErrorKind::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}

/// Split `---` delimited frontmatter from the body.
///
/// Returns `None` when the file does not open with a frontmatter block.
pub fn split_frontmatter(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))?;

    // Closing delimiter directly after the opening one (empty frontmatter)
    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", strip_line_end(body)));
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn strip_line_end(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// Drop top-level MDX `import`/`export` lines; they are module statements,
/// not content.
fn strip_mdx_statements(body: &str) -> String {
    body.lines()
        .filter(|line| !(line.starts_with("import ") || line.starts_with("export ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn a raw `redirect_from` value into aliases.
///
/// Falsy values mean "not set". A list of strings is the only valid form.
fn classify_aliases(value: serde_yaml::Value) -> Option<RedirectAliases> {
    use serde_yaml::Value;
    match value {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Sequence(items) => {
            let mut paths = Vec::with_capacity(items.len());
            for item in &items {
                match item {
                    Value::String(s) => paths.push(s.clone()),
                    other => {
                        return Some(RedirectAliases::Malformed(format!(
                            "a list containing {}",
                            describe_yaml(other)
                        )));
                    }
                }
            }
            Some(RedirectAliases::Paths(paths))
        }
        other => Some(RedirectAliases::Malformed(describe_yaml(&other))),
    }
}

fn describe_yaml(value: &serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Sequence(_) => "a nested list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(t) => format!("tagged value {}", t.tag),
    }
}

fn relative_source_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Stable document id: SHA-256 of the root-relative source path.
fn document_id(source_path: &str) -> String {
    format!("{:x}", Sha256::digest(source_path.as_bytes()))
}
