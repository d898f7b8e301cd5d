//! File system watcher for live rebuilds.
//!
//! Monitors the content, partial and template stores and re-renders every
//! content document after a batch of changes. The landing page, styles and
//! scripts are only processed by a full build.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Event Loop                         │
//! │                                                         │
//! │  ┌──────────┐    ┌──────────┐    ┌───────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│ rebuild_content() │  │
//! │  │ events   │    │ (300ms)  │    │ pages + listing   │  │
//! │  └──────────┘    └──────────┘    └───────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The persisted blog listing is written by every rebuild that changes it,
//! so its events are dropped before they reach the debouncer.

use crate::{build::rebuild_content, config::SiteConfig, log};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;

// =============================================================================
// Path Classification
// =============================================================================

/// Which store a changed path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchTarget {
    Content,
    Partial,
    Template,
}

impl WatchTarget {
    const ALL: [Self; 3] = [Self::Content, Self::Partial, Self::Template];

    const fn name(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Partial => "partials",
            Self::Template => "templates",
        }
    }

    fn dir(self, config: &SiteConfig) -> &Path {
        match self {
            Self::Content => &config.build.content,
            Self::Partial => &config.build.partials,
            Self::Template => &config.build.templates,
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Content => crate::site::CONTENT_EXT,
            Self::Partial | Self::Template => crate::site::partial::FRAGMENT_EXT,
        }
    }

    /// Classify a changed path, or `None` if it should not trigger a rebuild.
    fn classify(path: &Path, config: &SiteConfig) -> Option<Self> {
        if is_temp_file(path) || path == config.blog_index_source() {
            return None;
        }
        Self::ALL.into_iter().find(|target| {
            path.starts_with(target.dir(config))
                && path.extension().is_some_and(|ext| ext == target.extension())
        })
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Format path as relative to root for log display.
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and rebuild cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_rebuild: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_rebuild
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS))
    }

    fn add(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        self.pending.extend(paths);
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn mark_rebuild(&mut self) {
        self.last_rebuild = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Paths of an event that should trigger a rebuild.
fn relevant_paths(event: Event, config: &SiteConfig) -> Vec<PathBuf> {
    if !matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) {
        return Vec::new();
    }
    event
        .paths
        .into_iter()
        .filter(|path| WatchTarget::classify(path, config).is_some())
        .collect()
}

/// Re-render content for a batch of changes, logging failures.
fn handle_changes(paths: &[PathBuf], config: &SiteConfig) {
    let root = config.get_root();
    let changed: Vec<_> = paths.iter().map(|p| rel_path(p, root)).collect();
    log!("watch"; "{} changed, rebuilding...", changed.join(", "));

    match rebuild_content(config) {
        Ok(report) => log!("watch"; "rebuilt {} pages", report.pages.len()),
        Err(err) => {
            log!("error"; "rebuild failed");
            log!("error"; "{err:#}");
        }
    }
    eprintln!(); // Blank line to separate rebuild sessions
}

// =============================================================================
// Watcher Setup
// =============================================================================

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let mut watched = Vec::new();

    for target in WatchTarget::ALL {
        let path = target.dir(config);
        if !path.exists() {
            continue;
        }
        watcher
            .watch(path, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}: {}", target.name(), path.display()))?;
        watched.push(format!("{}/", rel_path(path, root)));
    }

    log!("watch"; "watching {}", watched.join(", "));
    eprintln!(); // Blank line to separate init logs from change events
    Ok(())
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and live rebuild.
pub fn watch_for_changes_blocking(config: &SiteConfig) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if !debouncer.in_cooldown() => {
                debouncer.add(relevant_paths(event, config));
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                handle_changes(&debouncer.take(), config);
                debouncer.mark_rebuild();
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            // Other cases: events during cooldown, timeout without ready, etc.
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.update_path_with_root(Path::new("/site"), Path::new("plainsite.toml"));
        config
    }

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/a/.post.md.swp")));
        assert!(is_temp_file(Path::new("/a/post.md~")));
        assert!(is_temp_file(Path::new("/a/post.tmp")));
        assert!(!is_temp_file(Path::new("/a/post.md")));
    }

    #[test]
    fn test_classify() {
        let config = config();
        let classify = |p: &str| WatchTarget::classify(Path::new(p), &config);

        assert_eq!(classify("/site/src/content/about.md"), Some(WatchTarget::Content));
        assert_eq!(classify("/site/src/content/blog/a.md"), Some(WatchTarget::Content));
        assert_eq!(classify("/site/src/partials/nav.html"), Some(WatchTarget::Partial));
        assert_eq!(classify("/site/src/templates/base.html"), Some(WatchTarget::Template));
        assert_eq!(classify("/site/src/styles/main.css"), None);
        assert_eq!(classify("/site/docs/about/index.html"), None);
        assert_eq!(classify("/site/src/content/notes.txt"), None);
    }

    #[test]
    fn test_persisted_index_is_ignored() {
        let config = config();
        assert_eq!(
            WatchTarget::classify(&config.blog_index_source(), &config),
            None
        );
    }

    #[test]
    fn test_relevant_paths() {
        let config = config();
        let ev = event(
            EventKind::Modify(ModifyKind::Any),
            &[
                "/site/src/content/blog/a.md",
                "/site/src/content/blog/blog.md",
                "/site/src/content/blog/.a.md.swp",
            ],
        );
        assert_eq!(
            relevant_paths(ev, &config),
            [PathBuf::from("/site/src/content/blog/a.md")]
        );

        let access = event(EventKind::Access(notify::event::AccessKind::Any), &["/site/src/content/a.md"]);
        assert!(relevant_paths(access, &config).is_empty());

        let created = event(EventKind::Create(CreateKind::File), &["/site/src/content/new.md"]);
        assert_eq!(relevant_paths(created, &config).len(), 1);
    }

    #[test]
    fn test_debouncer_batches() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.ready());
        assert_eq!(debouncer.timeout(), Duration::from_secs(60));

        debouncer.add(vec![PathBuf::from("/b.md"), PathBuf::from("/a.md")]);
        debouncer.add(vec![PathBuf::from("/a.md")]);
        assert!(!debouncer.ready());
        assert_eq!(debouncer.timeout(), Duration::from_millis(DEBOUNCE_MS));

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 50));
        assert!(debouncer.ready());
        assert_eq!(
            debouncer.take(),
            [PathBuf::from("/a.md"), PathBuf::from("/b.md")]
        );
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_debouncer_ignores_empty_batches() {
        let mut debouncer = Debouncer::new();
        debouncer.add(Vec::new());
        assert!(debouncer.last_event.is_none());
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_debouncer_cooldown() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.in_cooldown());
        debouncer.mark_rebuild();
        assert!(debouncer.in_cooldown());
    }
}
