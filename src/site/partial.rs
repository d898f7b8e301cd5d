//! Named HTML fragments referenced from templates as `{{name}}`.
//!
//! A partial is read from `<partials>/<name>.html` on every lookup, so edits
//! show up on the next watch rebuild without any cache to invalidate. Lookups
//! never fail: unknown or unreadable partials resolve to empty text.

use crate::log;
use std::{fs, io::ErrorKind, path::PathBuf};

/// File extension of partial and template files.
pub const FRAGMENT_EXT: &str = "html";

/// Source of partial bodies for the template compositor.
pub trait PartialSource {
    /// Body of the named partial, or empty text when it cannot be resolved.
    fn resolve(&self, name: &str) -> String;
}

/// Check that a partial or template name is a bare identifier.
///
/// Only ASCII letters, digits, `-` and `_` are accepted, which keeps names
/// from escaping their store through separators or `..`.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

/// Partials stored as files in one directory.
#[derive(Debug, Clone)]
pub struct PartialStore {
    dir: PathBuf,
}

impl PartialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PartialSource for PartialStore {
    fn resolve(&self, name: &str) -> String {
        if !is_identifier(name) {
            log!("warn"; "ignoring partial with invalid name `{name}`");
            return String::new();
        }

        let path = self.dir.join(format!("{name}.{FRAGMENT_EXT}"));
        match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => {
                log!("warn"; "partial `{name}` unreadable ({err}), using empty text");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("nav"));
        assert!(is_identifier("site-footer_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("../secret"));
        assert!(!is_identifier("a/b"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("a b"));
    }

    #[test]
    fn test_resolve_existing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("nav.html"), "<nav>N</nav>").unwrap();

        let store = PartialStore::new(dir.path());
        assert_eq!(store.resolve("nav"), "<nav>N</nav>");
    }

    #[test]
    fn test_resolve_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = PartialStore::new(dir.path());
        assert_eq!(store.resolve("footer"), "");
    }

    #[test]
    fn test_resolve_missing_store_is_empty() {
        let store = PartialStore::new("/nonexistent/partials/dir");
        assert_eq!(store.resolve("nav"), "");
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let partials = dir.path().join("partials");
        fs::create_dir_all(&partials).unwrap();
        fs::write(dir.path().join("secret.html"), "SECRET").unwrap();

        let store = PartialStore::new(&partials);
        assert_eq!(store.resolve("../secret"), "");
    }

    #[test]
    fn test_reads_fresh_every_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nav.html");
        let store = PartialStore::new(dir.path());

        fs::write(&path, "v1").unwrap();
        assert_eq!(store.resolve("nav"), "v1");
        fs::write(&path, "v2").unwrap();
        assert_eq!(store.resolve("nav"), "v2");
    }
}
