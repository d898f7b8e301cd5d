//! Content documents: YAML front matter plus a markdown body.
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-01-01
//! template: post
//! ---
//! # Body
//! ```
//!
//! The header block is optional. Attribute values are kept as YAML scalars;
//! accessors stringify them so `date: 2024` and `date: "2024"` read the same.

use super::error::BuildError;
use serde_yaml::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Template used when a document has no `template` attribute.
pub const DEFAULT_TEMPLATE: &str = "base";

/// Front matter delimiter line.
const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq)]
pub struct ContentDocument {
    /// Path relative to the content store, e.g. `blog/hello.md`.
    pub location: PathBuf,
    pub attributes: BTreeMap<String, Value>,
    /// Raw markdown.
    pub body: String,
}

impl ContentDocument {
    pub fn new(location: impl Into<PathBuf>, attributes: BTreeMap<String, Value>, body: String) -> Self {
        Self {
            location: location.into(),
            attributes,
            body,
        }
    }

    /// Parse a document's text.
    pub fn parse(location: impl Into<PathBuf>, text: &str) -> Result<Self, BuildError> {
        let location = location.into();
        let (header, body) = split_front_matter(text);

        let attributes = match header {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml).map_err(|source| {
                BuildError::FrontMatter {
                    document: location.clone(),
                    source,
                }
            })?,
            _ => BTreeMap::new(),
        };

        Ok(Self::new(location, attributes, body.to_owned()))
    }

    /// Read `<store>/<location>` and parse it.
    pub fn read(store: &Path, location: &Path) -> Result<Self, BuildError> {
        let path = store.join(location);
        let text = fs::read_to_string(&path).map_err(|err| BuildError::Io(path, err))?;
        Self::parse(location, &text)
    }

    /// Base name without extension.
    pub fn slug(&self) -> Result<&str, BuildError> {
        self.location
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BuildError::InvalidLocation(self.location.clone()))
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(scalar_to_string)
    }

    /// `title` attribute, falling back to the slug.
    pub fn title(&self) -> String {
        self.attribute("title")
            .or_else(|| self.slug().ok().map(str::to_owned))
            .unwrap_or_default()
    }

    pub fn date(&self) -> Option<String> {
        self.attribute("date")
    }

    pub fn template(&self) -> String {
        self.attribute("template")
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.trim().to_owned())
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_owned())
    }

    /// Serialize back to front matter + body.
    pub fn to_source(&self) -> String {
        if self.attributes.is_empty() {
            return self.body.clone();
        }
        // A map of string keys to YAML values always serializes
        let yaml = serde_yaml::to_string(&self.attributes).unwrap_or_default();
        format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{}", self.body)
    }
}

/// Split `---` delimited front matter from the body.
///
/// Returns `(None, text)` when the text does not open with a delimiter line
/// or the block is never closed.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = strip_delimiter_line(text) else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(header), body);
        }
        offset += line.len();
    }

    (None, text)
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    (first.trim_end() == DELIMITER).then_some(rest)
}

/// Render a scalar YAML value as text; sequences and mappings yield `None`.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
