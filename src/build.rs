//! Site building orchestration.
//!
//! Sequences the render pipeline over the content store and writes the
//! output tree. Everything runs on the calling thread, one page at a time.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── ensure_dirs()          stores + output exist
//!     ├── ensure_base_template() bootstrap `base.html` if missing
//!     ├── copy_assets()          styles/ and scripts/ → output
//!     ├── render_landing()       src/index.html <main> → index.html
//!     │
//!     └── render_content()       (rebuild_content() in watch mode)
//!             │
//!             ├── root documents    about.md → about/index.html
//!             ├── section documents blog/a.md → blog/a/index.html
//!             └── blog listing      synthesized → blog/index.html
//! ```

use crate::{
    config::{BasePath, SiteConfig},
    log,
    site::{
        BlogSettings, BuildError, ContentDocument, PartialStore, RenderContext, RenderedPage,
        Route, RouteKind, RouteTable, Router, TemplateStore, assets, build_index, collect_markdown,
        document::DEFAULT_TEMPLATE, template::escape_html,
    },
};
use anyhow::{Context, Result};
use chrono::Datelike;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Bootstrap template written when `<templates>/base.html` is missing.
const BASE_TEMPLATE: &str = include_str!("embed/template/base.html");

/// What one build pass wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written, relative to the output root, in render order.
    pub pages: Vec<PathBuf>,
    /// Static files copied.
    pub assets: usize,
    /// Whether the blog listing source was (re)written to the content store.
    pub index_persisted: bool,
}

/// Build the entire site.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    log!("build"; "{} mode, base path `{}`", config.mode.name(), config.base_path());

    ensure_dirs(config)?;
    ensure_base_template(config)?;

    let mut report = BuildReport {
        assets: copy_assets(config)?,
        ..BuildReport::default()
    };

    let base_path = config.base_path();
    let ctx = render_context(config, &base_path);
    let mut table = RouteTable::new();

    if let Some(page) = render_landing(config, &ctx)? {
        table.claim(&Route::home(), &config.build.landing)?;
        write_page(&page, &config.build.output, &mut report)?;
    }

    render_content(config, &ctx, &mut table, &mut report)?;

    log_build_result(&report);
    Ok(report)
}

/// Re-render every content document and the blog listing.
///
/// The landing page, assets and template bootstrap are left alone; watch
/// mode calls this for every change batch. An existing landing page still
/// owns the site root.
pub fn rebuild_content(config: &SiteConfig) -> Result<BuildReport> {
    let base_path = config.base_path();
    let ctx = render_context(config, &base_path);
    let mut table = RouteTable::new();
    let mut report = BuildReport::default();

    if config.build.landing.is_file() {
        table.claim(&Route::home(), &config.build.landing)?;
    }

    render_content(config, &ctx, &mut table, &mut report)?;
    Ok(report)
}

/// Root documents, then section documents, then the synthesized listing.
fn render_content(
    config: &SiteConfig,
    ctx: &RenderContext,
    table: &mut RouteTable,
    report: &mut BuildReport,
) -> Result<()> {
    let router = Router::new(&config.build.blog.section);
    render_root_documents(config, ctx, &router, table, report)?;
    let posts = render_section_documents(config, ctx, &router, table, report)?;
    render_blog_index(config, ctx, &router, &posts, table, report)
}

fn render_context<'a>(config: &'a SiteConfig, base_path: &'a BasePath) -> RenderContext<'a> {
    RenderContext {
        templates: TemplateStore::new(&config.build.templates),
        partials: PartialStore::new(&config.build.partials),
        base_path,
        section: &config.build.blog.section,
    }
}

/// Create every store and the output directory.
fn ensure_dirs(config: &SiteConfig) -> Result<()> {
    let build = &config.build;
    for dir in [
        &build.content,
        &build.templates,
        &build.partials,
        &build.styles,
        &build.scripts,
        &build.output,
    ] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Write the bootstrap `base` template unless one exists.
fn ensure_base_template(config: &SiteConfig) -> Result<()> {
    let path = TemplateStore::new(&config.build.templates).path(DEFAULT_TEMPLATE);
    if path.exists() {
        return Ok(());
    }

    fs::write(&path, default_template(config))
        .with_context(|| format!("Failed to write default template: {}", path.display()))?;
    log!("build"; "created default template {}", path.display());
    Ok(())
}

/// Bootstrap template text for this site.
// These are template placeholders, not format args
#[allow(clippy::literal_string_with_formatting_args)]
fn default_template(config: &SiteConfig) -> String {
    let year = chrono::Local::now().year().to_string();

    BASE_TEMPLATE
        .replace("{language}", &escape_html(&config.base.language))
        .replace("{section}", &config.build.blog.section)
        .replace("{blog_title}", &escape_html(&config.build.blog.title))
        .replace("{year}", &year)
        .replace("{author}", &escape_html(&config.base.author))
}

/// Copy styles and scripts into the output tree.
fn copy_assets(config: &SiteConfig) -> Result<usize> {
    let output = &config.build.output;
    let styles = assets::copy_dir(&config.build.styles, &output.join("styles"))?;
    let scripts = assets::copy_dir(&config.build.scripts, &output.join("scripts"))?;
    Ok(styles + scripts)
}

/// Render the landing page if one exists.
fn render_landing(config: &SiteConfig, ctx: &RenderContext) -> Result<Option<RenderedPage>> {
    let landing = &config.build.landing;
    let html = match fs::read_to_string(landing) {
        Ok(html) => html,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(BuildError::Io(landing.clone(), err).into()),
    };

    if crate::site::page::extract_main(&html).is_none() {
        log!("warn"; "{} has no <main> element, rendering it empty", landing.display());
    }
    let page = ctx.render_landing(&html, &config.base.title, landing)?;
    Ok(Some(page))
}

/// Render the markdown files directly inside the content store.
fn render_root_documents(
    config: &SiteConfig,
    ctx: &RenderContext,
    router: &Router,
    table: &mut RouteTable,
    report: &mut BuildReport,
) -> Result<()> {
    let content = &config.build.content;

    for location in collect_markdown(content, Path::new(""))? {
        let route = router.route(&location)?;
        if route.kind == RouteKind::Home {
            if !table.claim_or_skip(&route, &location) {
                continue;
            }
        } else {
            table.claim(&route, &location)?;
        }

        let doc = ContentDocument::read(content, &location)?;
        let page = ctx.render_document(&doc, &route)?;
        log!("content"; "{} -> {}", location.display(), route.url());
        write_page(&page, &config.build.output, report)?;
    }
    Ok(())
}

/// Render the blog section's posts; returns them for the listing.
fn render_section_documents(
    config: &SiteConfig,
    ctx: &RenderContext,
    router: &Router,
    table: &mut RouteTable,
    report: &mut BuildReport,
) -> Result<Vec<ContentDocument>> {
    let content = &config.build.content;
    let listing = blog_settings(config).index_location();

    let mut posts = Vec::new();
    for location in collect_markdown(content, Path::new(&config.build.blog.section))? {
        if location == listing {
            continue;
        }

        let route = router.route(&location)?;
        table.claim(&route, &location)?;

        let doc = ContentDocument::read(content, &location)?;
        let page = ctx.render_document(&doc, &route)?;
        log!("content"; "{} -> {}", location.display(), route.url());
        write_page(&page, &config.build.output, report)?;
        posts.push(doc);
    }
    Ok(posts)
}

/// Synthesize, persist and render the blog listing.
fn render_blog_index(
    config: &SiteConfig,
    ctx: &RenderContext,
    router: &Router,
    posts: &[ContentDocument],
    table: &mut RouteTable,
    report: &mut BuildReport,
) -> Result<()> {
    let index = build_index(posts, blog_settings(config));
    report.index_persisted = persist_index(config, &index)?;

    let route = router.route(&index.location)?;
    table.claim(&route, &index.location)?;

    let page = ctx.render_document(&index, &route)?;
    log!("blog"; "{} posts", posts.len());
    write_page(&page, &config.build.output, report)
}

fn blog_settings(config: &SiteConfig) -> BlogSettings<'_> {
    BlogSettings {
        section: &config.build.blog.section,
        title: &config.build.blog.title,
    }
}

/// Save the listing source next to the posts when its text changed.
///
/// The saved copy is never read back as input.
fn persist_index(config: &SiteConfig, index: &ContentDocument) -> Result<bool> {
    if !config.build.blog.persist_index {
        return Ok(false);
    }

    let path = config.blog_index_source();
    let text = index.to_source();
    if fs::read_to_string(&path).is_ok_and(|existing| existing == text) {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    log!("blog"; "updated {}", path.display());
    Ok(true)
}

fn write_page(page: &RenderedPage, output: &Path, report: &mut BuildReport) -> Result<()> {
    page.write(output)?;
    report.pages.push(page.output.clone());
    Ok(())
}

/// Log build result based on what was written
fn log_build_result(report: &BuildReport) {
    if report.pages.is_empty() {
        log!("warn"; "output is empty, check if content has .md files");
    } else {
        log!("build"; "done: {} pages, {} assets", report.pages.len(), report.assets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join(rel)).unwrap()
    }

    fn site_config(root: &Path, base_path: &str) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.base_path = base_path.to_owned();
        config.mode = if base_path.is_empty() {
            Mode::Development
        } else {
            Mode::Production
        };
        config.update_path_with_root(root, Path::new("plainsite.toml"));
        config
    }

    /// A small project: landing page, one root page, three posts, one stylesheet.
    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/index.html",
            r#"<!DOCTYPE html><html><body><main><h1>Hello</h1><a href="/about">About me</a></main></body></html>"#,
        );
        write(
            root,
            "src/content/about.md",
            "---\ntitle: About\n---\nSee the [blog](/blog) or [GitHub](https://github.com/x).",
        );
        write(root, "src/content/blog/a.md", "---\ntitle: A\ndate: 2024-01-01\n---\nPost A");
        write(root, "src/content/blog/b.md", "---\ntitle: B\ndate: 2024-03-01\n---\nPost B");
        write(root, "src/content/blog/c.md", "---\ntitle: C\ndate: 2023-12-15\n---\nPost C");
        write(root, "src/styles/main.css", "body { margin: 0; }");
        dir
    }

    fn all_html(output: &Path) -> Vec<(PathBuf, String)> {
        assets::collect_all_files(output)
            .unwrap()
            .into_iter()
            .filter(|p| p.extension().is_some_and(|e| e == "html"))
            .map(|p| {
                let html = fs::read_to_string(&p).unwrap();
                (p, html)
            })
            .collect()
    }

    #[test]
    fn test_build_under_base_path() {
        let dir = fixture();
        let config = site_config(dir.path(), "/P");
        let out = &config.build.output;

        let report = build_site(&config).unwrap();

        assert_eq!(
            report.pages,
            [
                "index.html",
                "about/index.html",
                "blog/a/index.html",
                "blog/b/index.html",
                "blog/c/index.html",
                "blog/index.html",
            ]
            .map(PathBuf::from)
        );
        assert_eq!(report.assets, 1);
        assert!(report.index_persisted);

        let home = read(out, "index.html");
        assert!(home.contains("<h1>Hello</h1>"));
        assert!(home.contains(r#"href="/P/about""#));
        assert!(home.contains(r#"href="/P/styles/main.css""#));
        assert!(home.contains("<title>Welcome to My Site</title>"));

        let about = read(out, "about/index.html");
        assert!(about.contains("<title>About</title>"));
        assert!(about.contains(r#"href="/P/blog""#));
        assert!(about.contains(r#"href="https://github.com/x""#));

        let listing = read(out, "blog/index.html");
        let b = listing.find(r#"href="/P/blog/b""#).unwrap();
        let a = listing.find(r#"href="/P/blog/a""#).unwrap();
        let c = listing.find(r#"href="/P/blog/c""#).unwrap();
        assert!(b < a && a < c);
        assert!(listing.contains("<title>Blog</title>"));

        assert_eq!(read(out, "styles/main.css"), "body { margin: 0; }");

        for (path, html) in all_html(out) {
            assert!(!html.contains("/P/P"), "double prefix in {}", path.display());
            assert!(!html.contains("blog/blog"), "doubled section in {}", path.display());
            assert!(!html.contains("{{"), "unfilled placeholder in {}", path.display());
        }
    }

    #[test]
    fn test_build_in_development_mode() {
        let dir = fixture();
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();

        let about = read(&config.build.output, "about/index.html");
        assert!(about.contains(r#"href="/blog""#));
        assert!(about.contains(r#"href="/styles/main.css""#));
    }

    #[test]
    fn test_default_template_materialized() {
        let dir = fixture();
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();

        let template = read(&config.build.templates, "base.html");
        assert!(template.contains("{{title}}"));
        assert!(template.contains("{{content}}"));
        assert!(template.contains(r#"<html lang="en">"#));
        assert!(template.contains(&chrono::Local::now().year().to_string()));
        assert!(template.contains("Your Name"));
    }

    #[test]
    fn test_existing_template_is_kept() {
        let dir = fixture();
        write(dir.path(), "src/templates/base.html", "<t>{{title}}</t>{{content}}");
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();

        assert_eq!(read(&config.build.templates, "base.html"), "<t>{{title}}</t>{{content}}");
        assert!(read(&config.build.output, "about/index.html").starts_with("<t>About</t>"));
    }

    #[test]
    fn test_rebuild_is_deterministic_and_index_excludes_itself() {
        let dir = fixture();
        let config = site_config(dir.path(), "/P");

        let first = build_site(&config).unwrap();
        let first_html = all_html(&config.build.output);
        let persisted = fs::read_to_string(config.blog_index_source()).unwrap();

        // The persisted listing now sits in the section directory
        let second = build_site(&config).unwrap();
        assert_eq!(second.pages, first.pages);
        assert!(!second.index_persisted);
        assert_eq!(all_html(&config.build.output), first_html);
        assert_eq!(fs::read_to_string(config.blog_index_source()).unwrap(), persisted);
    }

    #[test]
    fn test_persist_index_disabled() {
        let dir = fixture();
        let mut config = site_config(dir.path(), "");
        config.build.blog.persist_index = false;

        let report = build_site(&config).unwrap();
        assert!(!report.index_persisted);
        assert!(!config.blog_index_source().exists());
        assert!(config.build.output.join("blog/index.html").exists());
    }

    #[test]
    fn test_landing_wins_over_content_index() {
        let dir = fixture();
        write(dir.path(), "src/content/index.md", "---\ntitle: Content Home\n---\nfrom markdown");
        let config = site_config(dir.path(), "");

        let report = build_site(&config).unwrap();
        let home = read(&config.build.output, "index.html");
        assert!(home.contains("<h1>Hello</h1>"));
        assert!(!home.contains("from markdown"));
        assert_eq!(
            report.pages.iter().filter(|p| *p == Path::new("index.html")).count(),
            1
        );
    }

    #[test]
    fn test_content_index_without_landing() {
        let dir = fixture();
        fs::remove_file(dir.path().join("src/index.html")).unwrap();
        write(dir.path(), "src/content/index.md", "---\ntitle: Content Home\n---\nfrom markdown");
        let config = site_config(dir.path(), "");

        build_site(&config).unwrap();
        let home = read(&config.build.output, "index.html");
        assert!(home.contains("from markdown"));
        assert!(home.contains("<title>Content Home</title>"));
    }

    #[test]
    fn test_collision_is_an_error() {
        let dir = fixture();
        write(dir.path(), "src/content/blog.md", "A root page named like the section");
        let config = site_config(dir.path(), "");

        let err = build_site(&config).unwrap_err();
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::Collision { output, .. }) => {
                assert_eq!(output, Path::new("blog/index.html"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_template_fails_pass() {
        let dir = fixture();
        write(dir.path(), "src/content/blog/d.md", "---\ntemplate: post\n---\nx");
        let config = site_config(dir.path(), "");

        let err = build_site(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingTemplate { .. })
        ));
    }

    #[test]
    fn test_partials_are_read_fresh() {
        let dir = fixture();
        write(dir.path(), "src/templates/base.html", "{{footer}}|{{content}}");
        write(dir.path(), "src/partials/footer.html", "v1");
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();
        assert!(read(&config.build.output, "about/index.html").starts_with("v1|"));

        write(dir.path(), "src/partials/footer.html", "v2");
        rebuild_content(&config).unwrap();
        assert!(read(&config.build.output, "about/index.html").starts_with("v2|"));
    }

    #[test]
    fn test_rebuild_content_picks_up_new_post() {
        let dir = fixture();
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();

        write(dir.path(), "src/content/blog/d.md", "---\ntitle: D\ndate: 2025-01-01\n---\nPost D");
        let report = rebuild_content(&config).unwrap();

        assert!(report.pages.contains(&PathBuf::from("blog/d/index.html")));
        assert!(report.index_persisted);
        let listing = read(&config.build.output, "blog/index.html");
        let d = listing.find(r#"href="/blog/d""#).unwrap();
        let b = listing.find(r#"href="/blog/b""#).unwrap();
        assert!(d < b);
    }

    #[test]
    fn test_rebuild_keeps_landing_precedence() {
        let dir = fixture();
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();

        write(dir.path(), "src/content/index.md", "from markdown");
        let report = rebuild_content(&config).unwrap();

        assert!(!report.pages.contains(&PathBuf::from("index.html")));
        assert!(read(&config.build.output, "index.html").contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_scripts_copied_when_present() {
        let dir = fixture();
        let config = site_config(dir.path(), "");
        build_site(&config).unwrap();
        assert!(!config.build.output.join("scripts").exists());

        write(dir.path(), "src/scripts/app.js", "console.log(1);");
        let report = build_site(&config).unwrap();
        assert_eq!(report.assets, 2);
        assert_eq!(read(&config.build.output, "scripts/app.js"), "console.log(1);");
    }
}
