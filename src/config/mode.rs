//! Build mode and the deployment base path it selects.
//!
//! The mode is read once from `PLAINSITE_ENV` at startup. Production mode
//! applies `[build] base_path` to every internal reference; development mode
//! uses an empty prefix so the tree works from `/`.

use super::error::ConfigError;
use std::fmt;

/// Environment variable selecting the build mode.
pub const MODE_ENV: &str = "PLAINSITE_ENV";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    /// Read the mode from the process environment.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(MODE_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Normalized deployment prefix: either empty or `/seg[/seg...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
    /// The empty prefix used in development mode.
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Normalize a configured prefix.
    ///
    /// | Input | Result |
    /// |-------|--------|
    /// | `""`, `"/"` | `""` |
    /// | `"Static-Site"` | `"/Static-Site"` |
    /// | `"/Static-Site/"` | `"/Static-Site"` |
    /// | `"//a//b/"` | `"/a/b"` |
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.contains("://") {
            return Err(ConfigError::Validation(format!(
                "[build.base_path] must be a path, not a URL: `{raw}`"
            )));
        }
        if raw
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '?' | '#'))
        {
            return Err(ConfigError::Validation(format!(
                "[build.base_path] contains characters not allowed in a path prefix: `{raw}`"
            )));
        }

        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(ConfigError::Validation(format!(
                "[build.base_path] must not contain `.` or `..` segments: `{raw}`"
            )));
        }

        if segments.is_empty() {
            Ok(Self::root())
        } else {
            Ok(Self(format!("/{}", segments.join("/"))))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strip this prefix from a request path at a segment boundary.
    ///
    /// Returns the path unchanged when it does not carry the prefix.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        if self.is_empty() {
            return path;
        }
        match path.strip_prefix(self.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with(['/', '?', '#']) => rest,
            _ => path,
        }
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_value() {
        assert_eq!(Mode::from_value(None), Mode::Development);
        assert_eq!(Mode::from_value(Some("")), Mode::Development);
        assert_eq!(Mode::from_value(Some("development")), Mode::Development);
        assert_eq!(Mode::from_value(Some("production")), Mode::Production);
        assert_eq!(Mode::from_value(Some(" Production ")), Mode::Production);
    }

    #[test]
    fn test_base_path_normalization() {
        assert_eq!(BasePath::new("").unwrap().as_str(), "");
        assert_eq!(BasePath::new("/").unwrap().as_str(), "");
        assert_eq!(BasePath::new("Static-Site").unwrap().as_str(), "/Static-Site");
        assert_eq!(BasePath::new("/Static-Site/").unwrap().as_str(), "/Static-Site");
        assert_eq!(BasePath::new("//a//b/").unwrap().as_str(), "/a/b");
    }

    #[test]
    fn test_base_path_rejects_urls_and_junk() {
        assert!(BasePath::new("https://example.com/site").is_err());
        assert!(BasePath::new("/my site").is_err());
        assert!(BasePath::new("/a\"b").is_err());
        assert!(BasePath::new("/../etc").is_err());
    }

    #[test]
    fn test_base_path_strip() {
        let bp = BasePath::new("/P").unwrap();
        assert_eq!(bp.strip("/P/blog/a"), "/blog/a");
        assert_eq!(bp.strip("/P"), "");
        assert_eq!(bp.strip("/P/"), "/");
        assert_eq!(bp.strip("/Pages/x"), "/Pages/x");
        assert_eq!(bp.strip("/other"), "/other");

        assert_eq!(BasePath::root().strip("/P/x"), "/P/x");
    }
}
