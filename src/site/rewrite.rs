//! Base-path aware link rewriting.
//!
//! A page is rewritten by running a fixed sequence of pure text stages.
//! Stages 2–6 only look at `href`/`src` attribute values.
//!
//! | # | Stage | `/P` example |
//! |---|-------|--------------|
//! | 1 | [`Stage::SubstituteBasePath`] | `{{basePath}}/x` → `/P/x` |
//! | 2 | [`Stage::PrefixRootRelative`] | `/about` → `/P/about` |
//! | 3 | [`Stage::RestoreExternal`] | `/P/Phttps://a.io` → `https://a.io` |
//! | 4 | [`Stage::CollapseBasePath`] | `/P//P/about` → `/P/about` |
//! | 5 | [`Stage::CollapseSeparators`] | `/P//about` → `/P/about` |
//! | 6 | [`Stage::CollapseSection`] | `/P/blog/blog/a` → `/P/blog/a` |
//!
//! Stage 2 prefixes unconditionally, so content that already went through the
//! pipeline (or was written with the prefix) comes out of stage 2 with the
//! prefix twice; stage 4 exists to undo exactly that. Running the pipeline on
//! its own output is therefore a no-op.
//!
//! Scheme-qualified (`https:`, `mailto:`) and protocol-relative (`//host`)
//! values are never modified.

use crate::config::BasePath;
use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

/// `{{basePath}}`, tolerating blanks inside the braces.
static BASE_PATH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[ \t]*basePath[ \t]*\}\}").unwrap());

/// A whitespace-preceded `href=`/`src=` attribute with a quoted value.
static LINK_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s(?:href|src)\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Values every stage needs.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub base_path: &'a BasePath,
    /// Blog section directory name, e.g. `blog`.
    pub section: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SubstituteBasePath,
    PrefixRootRelative,
    RestoreExternal,
    CollapseBasePath,
    CollapseSeparators,
    CollapseSection,
}

/// Stage order. Prefixing must run before the collapsing stages.
pub const PIPELINE: [Stage; 6] = [
    Stage::SubstituteBasePath,
    Stage::PrefixRootRelative,
    Stage::RestoreExternal,
    Stage::CollapseBasePath,
    Stage::CollapseSeparators,
    Stage::CollapseSection,
];

/// Run the whole pipeline over a page.
pub fn rewrite(html: &str, ctx: &RewriteContext) -> String {
    PIPELINE
        .iter()
        .fold(html.to_owned(), |html, stage| stage.apply(&html, ctx))
}

impl Stage {
    /// Apply this stage to a whole page.
    pub fn apply(self, html: &str, ctx: &RewriteContext) -> String {
        let bp = ctx.base_path.as_str();
        match self {
            Self::SubstituteBasePath => BASE_PATH_TOKEN.replace_all(html, NoExpand(bp)).into_owned(),
            Self::PrefixRootRelative => map_link_values(html, |v| prefix_root_relative(v, bp)),
            Self::RestoreExternal => map_link_values(html, |v| restore_external(v, bp)),
            Self::CollapseBasePath => map_link_values(html, |v| collapse_base_path(v, bp)),
            Self::CollapseSeparators => map_link_values(html, collapse_separators),
            Self::CollapseSection => map_link_values(html, |v| collapse_section(v, ctx.section)),
        }
    }
}

/// Rewrite every link attribute value; `None` keeps the attribute as-is.
fn map_link_values(html: &str, mut f: impl FnMut(&str) -> Option<String>) -> String {
    LINK_ATTR
        .replace_all(html, |caps: &Captures| {
            let (value, quote) = match (caps.get(2), caps.get(3)) {
                (Some(v), _) => (v.as_str(), '"'),
                (None, Some(v)) => (v.as_str(), '\''),
                (None, None) => return caps[0].to_owned(),
            };
            match f(value) {
                Some(new) => format!("{}{quote}{new}{quote}", &caps[1]),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

// ============================================================================
// Value transforms
// ============================================================================

fn prefix_root_relative(value: &str, bp: &str) -> Option<String> {
    if bp.is_empty() || !is_root_relative(value) {
        return None;
    }
    Some(format!("{bp}{value}"))
}

/// Undo stages 1 and 2 on a scheme-qualified value.
///
/// `{{basePath}}https://a.io` reaches this stage as `/P/Phttps://a.io`, so the
/// base path is stripped as often as it repeats, with or without separators.
fn restore_external(value: &str, bp: &str) -> Option<String> {
    let segment = bp.trim_start_matches('/');
    if segment.is_empty() {
        return None;
    }
    let mut rest = value.strip_prefix(bp)?;
    while let Some(after) = rest.trim_start_matches('/').strip_prefix(segment) {
        rest = after;
    }
    let rest = rest.trim_start_matches('/');
    is_external_link(rest).then(|| rest.to_owned())
}

/// Fold a repeated leading base path into one, across empty segments.
fn collapse_base_path(value: &str, bp: &str) -> Option<String> {
    let segment = bp.trim_start_matches('/');
    if segment.is_empty() {
        return None;
    }
    let mut rest = value;
    while let Some(after) = rest.strip_prefix(bp) {
        let trimmed = after.trim_start_matches('/');
        let slashes = after.len() - trimmed.len();
        if slashes == 0 || !trimmed.strip_prefix(segment).is_some_and(is_segment_end) {
            break;
        }
        // Keep one separator so `rest` starts with the base path again
        rest = &after[slashes - 1..];
    }
    (rest.len() != value.len()).then(|| rest.to_owned())
}

fn collapse_separators(value: &str) -> Option<String> {
    if is_external_link(value) || value.starts_with("//") {
        return None;
    }
    let (path, tail) = split_path(value);
    if !path.contains("//") || path.contains("://") {
        return None;
    }

    let mut collapsed = String::with_capacity(value.len());
    for c in path.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed.push_str(tail);
    Some(collapsed)
}

fn collapse_section(value: &str, section: &str) -> Option<String> {
    if section.is_empty() || is_external_link(value) || value.starts_with("//") {
        return None;
    }
    let (path, tail) = split_path(value);
    let single = format!("/{section}");
    let doubled = format!("{single}{single}");

    let mut path = path.to_owned();
    let mut changed = false;
    loop {
        let inner = format!("{doubled}/");
        if let Some(pos) = path.find(&inner) {
            path.replace_range(pos..pos + doubled.len(), &single);
        } else if path.ends_with(&doubled) {
            path.truncate(path.len() - single.len());
        } else {
            break;
        }
        changed = true;
    }

    changed.then(|| format!("{path}{tail}"))
}

// ============================================================================
// Link classification
// ============================================================================

/// `/x` but not `//host`.
fn is_root_relative(value: &str) -> bool {
    value.starts_with('/') && !value.starts_with("//")
}

/// Check if a link is external (has a scheme like http:, mailto:, etc.)
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        let scheme = &link[..pos];
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// True when `rest` starts a new path segment (or ends the path).
fn is_segment_end(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(['/', '?', '#'])
}

/// Split a link into its path and the `?query#fragment` tail.
fn split_path(value: &str) -> (&str, &str) {
    let end = value.find(['?', '#']).unwrap_or(value.len());
    value.split_at(end)
}
