//! `[build]` section configuration.
//!
//! Source stores, output tree, deployment base path and blog section settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in plainsite.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "src/content"   # Markdown documents
/// output = "docs"           # Generated tree
/// base_path = "/Static-Site" # Prefix applied when PLAINSITE_ENV=production
///
/// [build.blog]
/// section = "blog"
/// title = "Blog"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Deployment path prefix (e.g. "/Static-Site"), only applied in production mode.
    #[serde(default = "defaults::build::base_path")]
    #[educe(Default = defaults::build::base_path())]
    pub base_path: String,

    /// Markdown content store.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Named HTML templates (`<name>.html`).
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Named HTML fragments referenced as `{{name}}` from templates.
    #[serde(default = "defaults::build::partials")]
    #[educe(Default = defaults::build::partials())]
    pub partials: PathBuf,

    /// Stylesheets, copied to `<output>/styles`.
    #[serde(default = "defaults::build::styles")]
    #[educe(Default = defaults::build::styles())]
    pub styles: PathBuf,

    /// Scripts, copied to `<output>/scripts`.
    #[serde(default = "defaults::build::scripts")]
    #[educe(Default = defaults::build::scripts())]
    pub scripts: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Hand-authored landing page rendered to the site root.
    #[serde(default = "defaults::build::landing")]
    #[educe(Default = defaults::build::landing())]
    pub landing: PathBuf,

    /// Blog section settings.
    #[serde(default)]
    pub blog: BlogConfig,
}

/// `[build.blog]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BlogConfig {
    /// Directory name of the blog section, inside both content and output.
    #[serde(default = "defaults::build::blog::section")]
    #[educe(Default = defaults::build::blog::section())]
    pub section: String,

    /// Title of the generated listing page.
    #[serde(default = "defaults::build::blog::title")]
    #[educe(Default = defaults::build::blog::title())]
    pub title: String,

    /// Write the generated listing back into the content store.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub persist_index: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.base_path, "");
        assert_eq!(config.build.content, PathBuf::from("src/content"));
        assert_eq!(config.build.templates, PathBuf::from("src/templates"));
        assert_eq!(config.build.partials, PathBuf::from("src/partials"));
        assert_eq!(config.build.styles, PathBuf::from("src/styles"));
        assert_eq!(config.build.scripts, PathBuf::from("src/scripts"));
        assert_eq!(config.build.output, PathBuf::from("docs"));
        assert_eq!(config.build.landing, PathBuf::from("src/index.html"));
        assert_eq!(config.build.blog.section, "blog");
        assert_eq!(config.build.blog.title, "Blog");
        assert!(config.build.blog.persist_index);
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            base_path = "/Static-Site"
            content = "pages"
            output = "public"

            [build.blog]
            section = "posts"
            title = "Writing"
            persist_index = false
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.base_path, "/Static-Site");
        assert_eq!(config.build.content, PathBuf::from("pages"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.blog.section, "posts");
        assert_eq!(config.build.blog.title, "Writing");
        assert!(!config.build.blog.persist_index);
    }

    #[test]
    fn test_unknown_blog_field_rejection() {
        let config = r#"
            [build.blog]
            paginate = 10
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
