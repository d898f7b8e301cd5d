//! Blog listing synthesized from post metadata.
//!
//! The listing is an ordinary [`ContentDocument`] at `<section>/<section>.md`
//! so it renders through the same template path as every other page.

use super::document::{ContentDocument, DEFAULT_TEMPLATE};
use crate::utils::date::parse_date;
use serde_yaml::Value;
use std::{
    collections::BTreeMap,
    fmt::Write,
    path::{Path, PathBuf},
};

/// Settings for one blog section.
#[derive(Debug, Clone, Copy)]
pub struct BlogSettings<'a> {
    pub section: &'a str,
    pub title: &'a str,
}

impl BlogSettings<'_> {
    /// Location of the listing relative to the content store.
    pub fn index_location(&self) -> PathBuf {
        Path::new(self.section).join(format!("{}.md", self.section))
    }
}

/// One listing line.
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    title: String,
    slug: String,
    date: Option<String>,
}

/// Build the listing document for `posts`, newest first.
///
/// Posts without a parseable date go last in input order. The listing's own
/// location is skipped if present among `posts`.
pub fn build_index(posts: &[ContentDocument], settings: BlogSettings) -> ContentDocument {
    let own = settings.index_location();

    let mut dated: Vec<_> = posts
        .iter()
        .filter(|doc| doc.location != own)
        .filter_map(|doc| {
            let slug = doc.slug().ok()?.to_owned();
            let date = doc.date();
            let sort_key = date.as_deref().and_then(parse_date);
            Some((
                sort_key,
                Entry {
                    title: doc.title(),
                    slug,
                    date,
                },
            ))
        })
        .collect();

    // Stable sort: `None` compares lowest, so reversing puts undated posts last
    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut body = String::new();
    for (_, entry) in &dated {
        // File names may hold spaces or parentheses, which would end the link
        let _ = write!(
            body,
            "- [{}](/{}/{})",
            escape_link_text(&entry.title),
            urlencoding::encode(settings.section),
            urlencoding::encode(&entry.slug)
        );
        if let Some(date) = &entry.date {
            let _ = write!(body, " - {date}");
        }
        body.push('\n');
    }

    let mut attributes = BTreeMap::new();
    attributes.insert("title".to_owned(), Value::String(settings.title.to_owned()));
    attributes.insert("template".to_owned(), Value::String(DEFAULT_TEMPLATE.to_owned()));

    ContentDocument::new(own, attributes, body)
}

/// Keep titles from closing the link label early.
fn escape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
