//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod site;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::EngineConfig;
use crate::engine::Engine;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(about = "Classify business websites and extract their products or menus")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML, or JSON by extension)
    #[arg(short, long, global = true, env = "SHOPFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a page as catalogue, menu, hybrid or none
    Detect {
        /// Page URL
        url: String,
    },

    /// Show which extractors would run for a page, and why
    Plan {
        /// Page URL
        url: String,
    },

    /// Extract products from a page
    Catalogue {
        /// Page URL
        url: String,
    },

    /// Extract menu items, optionally crawling linked menu pages
    Menu {
        /// Page URL
        url: String,
        /// Crawl up to this many menu pages (single page when omitted)
        #[arg(short = 'p', long)]
        max_pages: Option<usize>,
    },

    /// Run detection, extraction and quality assessment in one pass
    Analyze {
        /// Site URL
        url: String,
        /// Minimum item count for the quality check
        #[arg(short = 'm', long, default_value = "5")]
        min_items: usize,
    },
}

impl Commands {
    fn url(&self) -> &str {
        match self {
            Commands::Detect { url }
            | Commands::Plan { url }
            | Commands::Catalogue { url }
            | Commands::Menu { url, .. }
            | Commands::Analyze { url, .. } => url,
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    url::Url::parse(cli.command.url())
        .with_context(|| format!("Invalid URL: {}", cli.command.url()))?;

    let config = EngineConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?
        .resolve();

    if config.browser.executable.is_none() && config.browser.remote_url.is_none() {
        warn!("No Chrome executable found; set SHOPFRONT_CHROME_PATH or SHOPFRONT_BROWSER_URL");
    }

    let engine = Engine::new(&config);

    match cli.command {
        Commands::Detect { url } => site::cmd_detect(&engine, &url).await,
        Commands::Plan { url } => site::cmd_plan(&engine, &url).await,
        Commands::Catalogue { url } => site::cmd_catalogue(&engine, &url).await,
        Commands::Menu { url, max_pages } => site::cmd_menu(&engine, &url, max_pages).await,
        Commands::Analyze { url, min_items } => site::cmd_analyze(&engine, &url, min_items).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_with_budget() {
        let cli = Cli::try_parse_from([
            "shopfront",
            "--verbose",
            "menu",
            "https://anchor.example/menu",
            "--max-pages",
            "3",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Menu { url, max_pages } => {
                assert_eq!(url, "https://anchor.example/menu");
                assert_eq!(max_pages, Some(3));
            }
            _ => panic!("expected menu command"),
        }
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["shopfront", "analyze", "https://shop.example/"]).unwrap();
        match cli.command {
            Commands::Analyze { min_items, .. } => assert_eq!(min_items, 5),
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from([
            "shopfront",
            "detect",
            "https://shop.example/",
            "--config",
            "shopfront.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("shopfront.toml")));
        assert_eq!(cli.command.url(), "https://shop.example/");
    }
}
