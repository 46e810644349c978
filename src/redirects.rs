//! Frontmatter alias redirects.
//!
//! An article can list old paths under `redirect_from`. Each alias becomes a
//! permanent, browser-side redirect from `<base>/<alias>` to
//! `<base>/<path>`, in the order the author listed them.
//!
//! `redirect_from` must be a list of strings. A scalar, a map, or a list with
//! non-string items is an authoring mistake; it is rejected with a
//! [`PlanError`] rather than coerced, because silently dropping a redirect
//! breaks inbound links without anyone noticing.

use crate::naming::join_url;
use crate::types::{ContentDocument, RedirectAliases, RedirectRule};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(
        "`redirect_from` in {document} must either be a list of paths or not defined (found {found})"
    )]
    MalformedAliases { document: String, found: String },
}

/// Check that a document's alias field is usable, without building rules.
pub fn validate_aliases(doc: &ContentDocument) -> Result<(), PlanError> {
    match &doc.frontmatter.redirect_from {
        Some(RedirectAliases::Malformed(found)) => Err(PlanError::MalformedAliases {
            document: doc.source_path.clone(),
            found: found.clone(),
        }),
        _ => Ok(()),
    }
}

/// One redirect per alias, pointing at the document's canonical path.
pub fn plan_redirects(doc: &ContentDocument, base_path: &str) -> Result<Vec<RedirectRule>, PlanError> {
    validate_aliases(doc)?;
    let Some(RedirectAliases::Paths(aliases)) = &doc.frontmatter.redirect_from else {
        return Ok(Vec::new());
    };
    let canonical = join_url(base_path, &doc.frontmatter.path);
    Ok(aliases
        .iter()
        .map(|alias| RedirectRule::permanent(join_url(base_path, alias), canonical.clone()))
        .collect())
}
