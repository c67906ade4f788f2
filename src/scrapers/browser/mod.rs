//! Headless browser rendering for client-side rendered business sites.
//!
//! Uses chromiumoxide (CDP) to render each page with a fixed desktop user
//! agent, waits for the document and network to settle, and hands back the
//! serialized live DOM for read-only inspection.

mod config;
mod session;
mod types;

pub use config::{find_chrome, BrowserEngineConfig, DEFAULT_USER_AGENT};
pub use session::{PageSession, SessionLauncher};
pub use types::{RenderError, RenderedPage};

use async_trait::async_trait;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::Context;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

use crate::engine::EngineError;

#[cfg(feature = "browser")]
const READY_STATE_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            // Fallback timeout in case event never fires
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Resolves once no new resource entries have appeared for `__IDLE__` ms,
/// or after `__MAX__` ms on pages that keep polling.
#[cfg(feature = "browser")]
const NETWORK_IDLE_SCRIPT: &str = r#"
    new Promise((resolve) => {
        setTimeout(() => resolve(-1), __MAX__);
        let last = performance.getEntriesByType('resource').length;
        let quiet = 0;
        const tick = () => {
            const count = performance.getEntriesByType('resource').length;
            if (count === last) {
                quiet += 100;
                if (quiet >= __IDLE__) { resolve(count); return; }
            } else {
                last = count;
                quiet = 0;
            }
            setTimeout(tick, 100);
        };
        tick();
    })
"#;

#[cfg(feature = "browser")]
fn network_idle_script(config: &BrowserEngineConfig) -> String {
    NETWORK_IDLE_SCRIPT
        .replace("__IDLE__", &config.idle_window_ms.to_string())
        .replace("__MAX__", &config.idle_wait_limit_ms().to_string())
}

/// Browser session backed by a launched or remote Chrome instance.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    pub(crate) config: BrowserEngineConfig,
    pub(crate) browser: Option<Browser>,
    handler: Option<tokio::task::JoinHandle<()>>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Launch or connect to a browser.
    pub async fn launch(config: BrowserEngineConfig) -> anyhow::Result<Self> {
        if let Some(remote_url) = config.remote_url.clone() {
            return Self::connect_remote(config, &remote_url).await;
        }

        let chrome_path = config.executable.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "Chrome/Chromium not found. Please install it:\n\
                 - Arch/Manjaro: sudo pacman -S chromium\n\
                 - Ubuntu/Debian: sudo apt install chromium-browser\n\
                 - Fedora: sudo dnf install chromium\n\
                 - Or set SHOPFRONT_CHROME_PATH"
            )
        })?;

        info!("Launching browser (headless={})", config.headless);

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // Set headless mode (with_head means NOT headless, confusingly)
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox") // Containers rarely allow the sandbox
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            config,
            browser: Some(browser),
            handler: Some(handler),
        })
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(config: BrowserEngineConfig, url: &str) -> anyhow::Result<Self> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, config.timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(config.timeout),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .context("Failed to connect to remote browser")?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            config,
            browser: Some(browser),
            handler: Some(handler),
        })
    }

    /// Navigate an open tab and wait for the document and network to settle.
    async fn load(&self, page: &Page, url: &str) -> Result<RenderedPage, RenderError> {
        let nav_err = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        page.execute(SetUserAgentOverrideParams::new(self.config.user_agent.clone()))
            .await
            .map_err(nav_err)?;

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(RenderError::InvalidUrl)?;
        page.execute(nav_params).await.map_err(nav_err)?;

        match page.evaluate(READY_STATE_SCRIPT.to_string()).await {
            Ok(result) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Err(e) => debug!("Could not check ready state: {}", e),
        }

        // The snapshot is taken whether or not the network ever settles.
        let limit = Duration::from_millis(self.config.idle_wait_limit_ms());
        match tokio::time::timeout(limit, page.evaluate(network_idle_script(&self.config))).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!("Network idle wait skipped: {}", e),
            Err(_) => debug!("Network still busy after {:?}, snapshotting {}", limit, url),
        }

        let final_url = page
            .url()
            .await
            .map_err(nav_err)?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());

        let html = page.content().await.map_err(nav_err)?;

        Ok(RenderedPage::new(final_url, html))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageSession for BrowserFetcher {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError> {
        url::Url::parse(url).map_err(|e| RenderError::InvalidUrl(format!("{}: {}", url, e)))?;

        let browser = self.browser.as_ref().ok_or_else(|| RenderError::Navigation {
            url: url.to_string(),
            reason: "browser session already closed".to_string(),
        })?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let timeout = Duration::from_secs(self.config.timeout);
        let result = tokio::time::timeout(timeout, self.load(&page, url)).await;

        // Close the tab to prevent accumulation across a crawl
        let _ = page.close().await;

        match result {
            Ok(rendered) => rendered,
            Err(_) => {
                warn!("Timeout rendering {}", url);
                Err(RenderError::Timeout {
                    url: url.to_string(),
                    secs: self.config.timeout,
                })
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Browser close failed: {}", e);
            }
            let _ = browser.wait().await;
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[allow(dead_code)]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub async fn launch(_config: BrowserEngineConfig) -> anyhow::Result<Self> {
        Err(anyhow::anyhow!(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
        ))
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageSession for BrowserFetcher {
    async fn render(&mut self, _url: &str) -> Result<RenderedPage, RenderError> {
        Err(RenderError::Unavailable)
    }

    async fn close(&mut self) {}
}

/// Launches one [`BrowserFetcher`] per engine run.
#[derive(Debug, Clone)]
pub struct BrowserLauncher {
    config: BrowserEngineConfig,
}

impl BrowserLauncher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for BrowserLauncher {
    type Session = BrowserFetcher;

    async fn launch(&self) -> Result<BrowserFetcher, EngineError> {
        BrowserFetcher::launch(self.config.clone())
            .await
            .map_err(|e| EngineError::Launch(format!("{:#}", e)))
    }
}
