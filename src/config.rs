//! Engine configuration: TOML/JSON file, environment overrides, one-time resolution.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::EngineError;
use crate::quality::DEFAULT_PASS_THRESHOLD;
use crate::scrapers::BrowserEngineConfig;

/// Default page budget for menu crawls.
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Default number of internal links read per crawled page.
pub const DEFAULT_LINK_SAMPLE: usize = 50;

/// Crawl and quality settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Page visits allowed per multi-page menu crawl.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Internal links read from each crawled page.
    #[serde(default = "default_link_sample")]
    pub link_sample: usize,

    /// Quality score (0-100) an item set must reach to pass.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            link_sample: default_link_sample(),
            quality_threshold: default_quality_threshold(),
        }
    }
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_link_sample() -> usize {
    DEFAULT_LINK_SAMPLE
}

fn default_quality_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub browser: BrowserEngineConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,
}

impl EngineConfig {
    /// Load configuration from a file. TOML unless the extension says JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            EngineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let config = match ext {
            "json" => serde_json::from_str(&contents)
                .map_err(|e| EngineError::Config(format!("Failed to parse JSON config: {}", e)))?,
            _ => toml::from_str(&contents)
                .map_err(|e| EngineError::Config(format!("Failed to parse TOML config: {}", e)))?,
        };

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an optional path, falling back to defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::load_from_path(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Apply process environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // SHOPFRONT_CHROME_PATH wins over the generic CHROME_PATH
        if let Some(path) = get("SHOPFRONT_CHROME_PATH").or_else(|| get("CHROME_PATH")) {
            debug!("Using Chrome executable from environment: {}", path);
            self.browser.executable = Some(PathBuf::from(path));
        }

        if let Some(url) = get("SHOPFRONT_BROWSER_URL") {
            debug!("Using remote browser from environment: {}", url);
            self.browser.remote_url = Some(url);
        }

        if let Some(timeout) = get("SHOPFRONT_NAV_TIMEOUT") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.browser.timeout = secs,
                _ => debug!("Ignoring invalid SHOPFRONT_NAV_TIMEOUT: {}", timeout),
            }
        }

        self
    }

    /// Resolve everything that depends on the host once, at startup:
    /// environment overrides first, then the browser executable.
    pub fn resolve(self) -> Self {
        let mut config = self.with_env_overrides();
        config.browser.resolve_executable();
        config
    }
}
