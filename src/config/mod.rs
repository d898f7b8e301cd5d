//! Site configuration management for `plainsite.toml`.
//!
//! # Sections
//!
//! | Section          | Purpose                                         |
//! |------------------|-------------------------------------------------|
//! | `[base]`         | Landing page title, footer author, language     |
//! | `[build]`        | Store directories, output tree, base path       |
//! | `[build.blog]`   | Blog section name and listing page              |
//! | `[serve]`        | Development server (interface, port)            |
//!
//! The config file is optional: a project without one builds with the
//! defaults below.
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Welcome to My Site"
//!
//! [build]
//! output = "docs"
//! base_path = "/Static-Site"
//!
//! [serve]
//! port = 3000
//! ```

mod base;
mod build;
pub mod defaults;
mod error;
mod mode;
mod serve;

pub use error::ConfigError;
pub use mode::{BasePath, Mode};

use base::BaseConfig;
use build::BuildConfig;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing plainsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build mode, read from the environment once at startup
    #[serde(skip)]
    pub mode: Mode,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// The prefix every internal reference carries in the current mode.
    ///
    /// Assumes [`SiteConfig::validate`] has accepted `[build.base_path]`;
    /// an invalid value falls back to the empty prefix.
    pub fn base_path(&self) -> BasePath {
        match self.mode {
            Mode::Development => BasePath::root(),
            Mode::Production => BasePath::new(&self.build.base_path).unwrap_or_default(),
        }
    }

    /// Location of the generated blog listing inside the content store.
    pub fn blog_index_source(&self) -> PathBuf {
        let section = &self.build.blog.section;
        self.build
            .content
            .join(section)
            .join(format!("{section}.md"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.update_path_with_root(&root, &cli.config);

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    pub fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_name));

        let build = &mut self.build;
        for dir in [
            &mut build.content,
            &mut build.templates,
            &mut build.partials,
            &mut build.styles,
            &mut build.scripts,
            &mut build.output,
            &mut build.landing,
        ] {
            *dir = Self::normalize_path(&root.join(&*dir));
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let section = &self.build.blog.section;
        if section.is_empty()
            || !section
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            bail!(ConfigError::Validation(format!(
                "[build.blog.section] must be a single path segment, got `{section}`"
            )));
        }

        // The rewriter collapses repeated base paths and doubled section
        // segments; a base path containing the section would be ambiguous
        let base_path = BasePath::new(&self.build.base_path)?;
        if base_path.as_str().split('/').any(|segment| segment == section) {
            bail!(ConfigError::Validation(format!(
                "[build.base_path] `{base_path}` must not contain the blog section `{section}`"
            )));
        }

        if self.build.output == self.build.content {
            bail!(ConfigError::Validation(
                "[build.output] must differ from [build.content]".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
