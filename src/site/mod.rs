//! Site model and rendering pipeline.
//!
//! - **document**: front matter + markdown source files
//! - **route**: source location → output location
//! - **partial** / **template**: `{{placeholder}}` composition
//! - **rewrite**: base-path aware link rewriting
//! - **blog**: synthesized section listing
//! - **page**: one document → one finished HTML page
//! - **assets**: static file copying
//!
//! # Render Flow
//!
//! ```text
//! ContentDocument ──► Router ──► Route
//!        │                         │
//!        ▼                         ▼
//!   RenderContext::render_document() ──► RenderedPage ──► output tree
//! ```

pub mod assets;
pub mod blog;
pub mod document;
pub mod error;
pub mod markdown;
pub mod page;
pub mod partial;
pub mod rewrite;
pub mod route;
pub mod template;

pub use blog::{BlogSettings, build_index};
pub use document::ContentDocument;
pub use error::BuildError;
pub use page::{RenderContext, RenderedPage};
pub use partial::PartialStore;
pub use route::{Route, RouteKind, RouteTable, Router};
pub use template::TemplateStore;

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Extension of content documents.
pub const CONTENT_EXT: &str = "md";

/// List the markdown files directly inside `<store>/<dir>`, in file-name order.
///
/// Returned locations are relative to `store`. A missing directory has no
/// documents.
pub fn collect_markdown(store: &Path, dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let full = store.join(dir);
    let entries = match fs::read_dir(&full) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(BuildError::Io(full, err)),
    };

    let mut locations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| BuildError::Io(full.clone(), err))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == CONTENT_EXT) {
            locations.push(dir.join(entry.file_name()));
        }
    }
    locations.sort();
    Ok(locations)
}
