//! Browser engine configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tracing::info;

/// Desktop user agent presented on every navigation.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Executable names looked up on PATH.
const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Chrome/Chromium executable. Resolved once at startup when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Navigation timeout in seconds, applied per page.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Quiet window (ms) with no new network resources before a page counts as idle.
    #[serde(default = "default_idle_window_ms")]
    pub idle_window_ms: u64,

    /// User agent sent with every navigation.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: default_headless(),
            timeout: default_timeout(),
            idle_window_ms: default_idle_window_ms(),
            user_agent: default_user_agent(),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

pub fn default_idle_window_ms() -> u64 {
    500
}

pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl BrowserEngineConfig {
    /// Fill in the executable path from well-known locations or PATH.
    ///
    /// Leaves the value untouched when it is already set or a remote
    /// browser is configured.
    pub fn resolve_executable(&mut self) {
        if self.executable.is_some() || self.remote_url.is_some() {
            return;
        }
        self.executable = find_chrome();
    }

    /// Longest wait for the network to go quiet before the DOM is snapshotted
    /// anyway: half the navigation timeout, never shorter than the idle window.
    pub fn idle_wait_limit_ms(&self) -> u64 {
        (self.timeout.saturating_mul(1000) / 2).max(self.idle_window_ms)
    }
}

/// Find a Chrome executable on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Some(p.to_path_buf());
        }
    }

    for cmd in CHROME_COMMANDS {
        if let Ok(path) = which::which(cmd) {
            info!("Found Chrome in PATH: {}", path.display());
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserEngineConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_idle_wait_limit_stays_inside_timeout() {
        let config = BrowserEngineConfig::default();
        assert_eq!(config.idle_wait_limit_ms(), 15_000);
        assert!(config.idle_wait_limit_ms() < config.timeout * 1000);

        let short = BrowserEngineConfig {
            timeout: 0,
            ..Default::default()
        };
        assert_eq!(short.idle_wait_limit_ms(), short.idle_window_ms);
    }

    #[test]
    fn test_resolve_keeps_explicit_executable() {
        let mut config = BrowserEngineConfig {
            executable: Some(PathBuf::from("/custom/chrome")),
            ..Default::default()
        };
        config.resolve_executable();
        assert_eq!(config.executable, Some(PathBuf::from("/custom/chrome")));
    }

    #[test]
    fn test_resolve_skipped_for_remote() {
        let mut config = BrowserEngineConfig {
            remote_url: Some("ws://localhost:9222".to_string()),
            ..Default::default()
        };
        config.resolve_executable();
        assert!(config.executable.is_none());
    }
}
