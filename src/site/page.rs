//! Rendering documents into finished pages.
//!
//! # Pipeline
//!
//! ```text
//! template ──► compose(partials) ──► fill(title, markdown html) ──► rewrite(base path)
//! ```
//!
//! Templates and partials are read from disk for every page.

use super::{
    document::{ContentDocument, DEFAULT_TEMPLATE},
    error::BuildError,
    markdown,
    partial::PartialStore,
    rewrite::{self, RewriteContext},
    route::Route,
    template::{self, TemplateStore},
};
use crate::config::BasePath;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// First `<main>` element of the landing page.
static MAIN_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<main(?:\s[^>]*)?>(.*?)</main>").unwrap());

/// A page ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Path relative to the output root.
    pub output: PathBuf,
    pub html: String,
}

impl RenderedPage {
    /// Write the page below `root`, creating directories; returns the full path.
    pub fn write(&self, root: &Path) -> Result<PathBuf, BuildError> {
        let path = root.join(&self.output);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| BuildError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(&path, &self.html).map_err(|err| BuildError::Io(path.clone(), err))?;
        Ok(path)
    }
}

/// Everything a page render reads.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub templates: TemplateStore,
    pub partials: PartialStore,
    pub base_path: &'a BasePath,
    pub section: &'a str,
}

impl RenderContext<'_> {
    /// Render a content document at its route.
    pub fn render_document(
        &self,
        doc: &ContentDocument,
        route: &Route,
    ) -> Result<RenderedPage, BuildError> {
        let name = doc.template();
        let source = self.templates.load(&name, &doc.location)?;
        let body = markdown::render(&doc.body);
        Ok(self.finish(&source, &doc.title(), &body, route))
    }

    /// Render the hand-authored landing page through the base template.
    ///
    /// Only the inside of its `<main>` element is used. A landing page without
    /// one renders with empty content.
    pub fn render_landing(
        &self,
        html: &str,
        title: &str,
        location: &Path,
    ) -> Result<RenderedPage, BuildError> {
        let source = self.templates.load(DEFAULT_TEMPLATE, location)?;
        let content = extract_main(html).unwrap_or_default();
        Ok(self.finish(&source, title, content, &Route::home()))
    }

    fn finish(&self, template: &str, title: &str, content: &str, route: &Route) -> RenderedPage {
        let composed = template::compose(template, &self.partials);
        let filled = template::fill(&composed, title, content);
        let ctx = RewriteContext {
            base_path: self.base_path,
            section: self.section,
        };
        RenderedPage {
            output: route.output(),
            html: rewrite::rewrite(&filled, &ctx),
        }
    }
}

/// Inner HTML of the first `<main>` element.
pub fn extract_main(html: &str) -> Option<&str> {
    MAIN_ELEMENT
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
