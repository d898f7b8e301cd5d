//! plainsite - a minimal static site generator for markdown pages and a blog.

mod build;
mod cli;
mod config;
mod serve;
mod site;
mod utils;
mod watch;

use anyhow::{Context, Result};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::{Mode, SiteConfig};
use serve::serve_site;
use std::path::Path;
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Build { watch: false } => build_site(&config).map(|_| ()),
        Commands::Build { watch: true } => {
            // A failed first pass still leaves the watcher running
            if let Err(err) = build_site(&config) {
                log!("error"; "{err:#}");
            }
            watch_for_changes_blocking(&config)
        }
        Commands::Serve { .. } => serve_site(&config),
    }
}

/// Load and validate configuration from CLI arguments
///
/// The config file is optional; without one every setting takes its default.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else {
        SiteConfig::default()
    };
    config.mode = Mode::from_env();
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
