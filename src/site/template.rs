//! Named templates and placeholder expansion.
//!
//! Templates use literal `{{identifier}}` placeholders. Three names are
//! reserved for page values; every other placeholder names a partial.
//!
//! ```text
//! <title>{{title}}</title>          reserved, filled per page
//! {{nav}}                           partial, expanded by compose()
//! <main>{{content}}</main>          reserved, filled per page
//! <a href="{{basePath}}/">Home</a>  reserved, substituted by the rewriter
//! ```
//!
//! Expansion is one pass over the template text: bodies inserted for a
//! placeholder are never scanned again, so a partial containing `{{x}}` or
//! `{{title}}` is emitted verbatim. A `{{basePath}}` inside a partial still
//! reaches the rewriter, which substitutes it over the whole page.

use super::{
    error::BuildError,
    partial::{FRAGMENT_EXT, PartialSource, is_identifier},
};
use regex::Regex;
use std::{
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub const TITLE: &str = "title";
pub const CONTENT: &str = "content";
pub const BASE_PATH: &str = "basePath";

/// Placeholders left for the caller by [`compose`].
pub const RESERVED: [&str; 3] = [TITLE, CONTENT, BASE_PATH];

/// `{{name}}`, tolerating blanks inside the braces.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[ \t]*([A-Za-z0-9_-]+)[ \t]*\}\}").unwrap());

/// Templates stored as `<dir>/<name>.html`, read on every load.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{FRAGMENT_EXT}"))
    }

    /// Load the template `name` requested by `document`.
    pub fn load(&self, name: &str, document: &Path) -> Result<String, BuildError> {
        if !is_identifier(name) {
            return Err(BuildError::InvalidTemplateName {
                template: name.to_owned(),
                document: document.to_path_buf(),
            });
        }

        let path = self.path(name);
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => BuildError::MissingTemplate {
                template: name.to_owned(),
                document: document.to_path_buf(),
                path: path.clone(),
            },
            _ => BuildError::Io(path.clone(), err),
        })
    }
}

/// One piece of a composed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    /// Template text or an inserted partial body, emitted verbatim.
    Text(String),
    /// A reserved placeholder left open, with its original token text.
    Slot { name: &'static str, token: String },
}

/// A template with every partial expanded and the reserved placeholders
/// left open.
///
/// Partial bodies are held as opaque text, so [`fill`] only ever sees the
/// template's own `{{title}}` and `{{content}}` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composed {
    parts: Vec<Part>,
}

impl Composed {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(Part::Text(last)) => last.push_str(text),
            _ => self.parts.push(Part::Text(text.to_owned())),
        }
    }
}

impl fmt::Display for Composed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Text(text) => f.write_str(text)?,
                Part::Slot { token, .. } => f.write_str(token)?,
            }
        }
        Ok(())
    }
}

/// Expand every non-reserved placeholder with the named partial.
pub fn compose(template: &str, partials: &impl PartialSource) -> Composed {
    let mut composed = Composed::default();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        composed.push_text(&template[last..token.start()]);
        last = token.end();

        match RESERVED.iter().find(|r| **r == name.as_str()) {
            Some(reserved) => composed.parts.push(Part::Slot {
                name: *reserved,
                token: token.as_str().to_owned(),
            }),
            None => composed.push_text(&partials.resolve(name.as_str())),
        }
    }
    composed.push_text(&template[last..]);
    composed
}

/// Fill `{{title}}` and `{{content}}` in a composed template.
///
/// Only the template's own reserved tokens are filled; text inside partial
/// bodies is left alone. `{{basePath}}` is kept for the rewriter. The title
/// is HTML-escaped; content is inserted as-is.
pub fn fill(composed: &Composed, title: &str, content: &str) -> String {
    let title = escape_html(title);
    let mut out = String::new();
    for part in &composed.parts {
        match part {
            Part::Text(text) => out.push_str(text),
            Part::Slot { name: TITLE, .. } => out.push_str(&title),
            Part::Slot { name: CONTENT, .. } => out.push_str(content),
            Part::Slot { token, .. } => out.push_str(token),
        }
    }
    out
}

/// Escape text for use in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
