//! Mapping content documents to locations in the generated tree.
//!
//! | Source (in content store) | Output (in output tree) |
//! |---------------------------|-------------------------|
//! | `index.md` | `index.html` |
//! | `about.md` | `about/index.html` |
//! | `blog/hello.md` | `blog/hello/index.html` |
//! | `blog/blog.md` (listing) | `blog/index.html` |
//!
//! Every page lands in its own directory as `index.html`, so links can use
//! clean extensionless URLs.

use super::error::BuildError;
use crate::log;
use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

/// File written for every routed page.
pub const INDEX_FILE: &str = "index.html";

/// Base name of the document that becomes the site root.
const HOME_SLUG: &str = "index";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `index.md` or the landing page, written to the site root.
    Home,
    /// Any other root document.
    Page,
    /// A document inside the blog section.
    Post,
    /// The blog section's own listing.
    Listing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: RouteKind,
    /// Output directory relative to the output root (empty for the root).
    pub dir: PathBuf,
}

impl Route {
    pub fn home() -> Self {
        Self {
            kind: RouteKind::Home,
            dir: PathBuf::new(),
        }
    }

    /// Output file relative to the output root.
    pub fn output(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Root-relative URL path of the page, without base path.
    pub fn url(&self) -> String {
        let dir = self.dir.to_string_lossy().replace('\\', "/");
        if dir.is_empty() {
            "/".to_owned()
        } else {
            format!("/{dir}")
        }
    }
}

/// Routing policy for one content store.
#[derive(Debug, Clone)]
pub struct Router<'a> {
    section: &'a str,
}

impl<'a> Router<'a> {
    pub const fn new(section: &'a str) -> Self {
        Self { section }
    }

    /// Route a document by its location relative to the content store.
    pub fn route(&self, location: &Path) -> Result<Route, BuildError> {
        let slug = location
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BuildError::InvalidLocation(location.to_path_buf()))?;

        if self.in_section(location) {
            return Ok(if slug == self.section {
                // The section root, so `/<section>` is the listing and its
                // `/<section>/<slug>` links stay one level deep
                Route {
                    kind: RouteKind::Listing,
                    dir: PathBuf::from(self.section),
                }
            } else {
                Route {
                    kind: RouteKind::Post,
                    dir: Path::new(self.section).join(slug),
                }
            });
        }

        if slug == HOME_SLUG {
            return Ok(Route::home());
        }

        Ok(Route {
            kind: RouteKind::Page,
            dir: PathBuf::from(slug),
        })
    }

    /// Whether a location is inside the blog section.
    fn in_section(&self, location: &Path) -> bool {
        let mut components = location.components().filter(|c| !matches!(c, Component::CurDir));
        matches!(components.next(), Some(Component::Normal(first)) if first == self.section)
            && components.next().is_some()
    }
}

/// Output locations claimed during one build pass.
#[derive(Debug, Default)]
pub struct RouteTable {
    claims: BTreeMap<PathBuf, PathBuf>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `route` for `source`; a second claim on the same output fails.
    pub fn claim(&mut self, route: &Route, source: &Path) -> Result<(), BuildError> {
        let output = route.output();
        if let Some(first) = self.claims.get(&output) {
            return Err(BuildError::Collision {
                output,
                first: first.clone(),
                second: source.to_path_buf(),
            });
        }
        self.claims.insert(output, source.to_path_buf());
        Ok(())
    }

    /// Claim `route` unless something already owns it; returns whether it was claimed.
    ///
    /// Used for the content-store `index.md` when a landing page already
    /// owns the site root.
    pub fn claim_or_skip(&mut self, route: &Route, source: &Path) -> bool {
        let output = route.output();
        if let Some(owner) = self.claims.get(&output) {
            log!("warn"; "skipping `{}`: `{}` already renders to `{}`",
                source.display(), owner.display(), output.display());
            return false;
        }
        self.claims.insert(output, source.to_path_buf());
        true
    }
}
