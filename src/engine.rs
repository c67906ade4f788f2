//! Public operations. Each call owns one browser session for its lifetime.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{CrawlConfig, EngineConfig};
use crate::detection::{
    self, DetectionScores, DetectionSignals, ExtractionPlan, Extractor, PrimaryType,
};
use crate::dom::PageView;
use crate::extraction::{
    self, ExtractedMenuItem, ExtractedProduct, MenuCrawl, MultiPageMenuItem,
};
use crate::quality::{validate_with_threshold, QualityAssessment};
use crate::scrapers::{BrowserLauncher, PageSession, RenderedPage, SessionLauncher};

pub use crate::detection::derive_extraction_plan;
pub use crate::quality::validate_extraction_quality;

/// Failures surfaced to callers. Render and parse failures never are.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Everything the full pipeline learned about one site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub url: String,
    pub final_url: Option<String>,
    pub scores: DetectionScores,
    pub plan: ExtractionPlan,
    pub products: Vec<ExtractedProduct>,
    pub menu_items: Vec<MultiPageMenuItem>,
    pub catalogue_quality: Option<QualityAssessment>,
    pub menu_quality: Option<QualityAssessment>,
    pub analyzed_at: DateTime<Utc>,
}

pub struct Engine<L: SessionLauncher = BrowserLauncher> {
    launcher: L,
    crawl: CrawlConfig,
}

impl Engine<BrowserLauncher> {
    /// Build an engine from resolved configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_launcher(BrowserLauncher::new(config.browser.clone()), config.crawl.clone())
    }
}

impl<L: SessionLauncher> Engine<L> {
    pub fn with_launcher(launcher: L, crawl: CrawlConfig) -> Self {
        Self { launcher, crawl }
    }

    /// Classify a page. A page that fails to render classifies as `none`.
    pub async fn detect_site_type(&self, url: &str) -> Result<DetectionScores, EngineError> {
        let mut session = self.launcher.launch().await?;
        let page = render_once(&mut session, url).await;
        session.close().await;

        let scores = match page {
            Some(page) => detect_page(&page),
            None => detection::score(DetectionSignals::default()),
        };
        info!(url, primary_type = ?scores.primary_type, confidence = scores.confidence, "Detection complete");
        Ok(scores)
    }

    pub async fn extract_catalogue_items(
        &self,
        url: &str,
    ) -> Result<Vec<ExtractedProduct>, EngineError> {
        let mut session = self.launcher.launch().await?;
        let page = render_once(&mut session, url).await;
        session.close().await;

        let products = page.as_ref().map(catalogue_page).unwrap_or_default();
        info!(url, count = products.len(), "Catalogue extraction complete");
        Ok(products)
    }

    pub async fn extract_menu_items(
        &self,
        url: &str,
    ) -> Result<Vec<ExtractedMenuItem>, EngineError> {
        let mut session = self.launcher.launch().await?;
        let page = render_once(&mut session, url).await;
        session.close().await;

        let items = page.as_ref().map(menu_page).unwrap_or_default();
        info!(url, count = items.len(), "Menu extraction complete");
        Ok(items)
    }

    /// Crawl up to `max_pages` menu pages from `url`.
    pub async fn extract_menu_items_multi_page(
        &self,
        url: &str,
        max_pages: usize,
    ) -> Result<Vec<MultiPageMenuItem>, EngineError> {
        let mut session = self.launcher.launch().await?;
        let crawl = extraction::crawl_menu(&mut session, url, max_pages, self.crawl.link_sample).await;
        session.close().await;
        Ok(crawl.items)
    }

    /// Render, classify, plan, extract and assess in one session.
    ///
    /// Extractors run in the plan's priority order. Menus are gathered with
    /// the multi-page crawl bounded by the configured page budget, starting
    /// from the page's final URL.
    pub async fn analyze_site(
        &self,
        url: &str,
        minimum_items: usize,
    ) -> Result<SiteReport, EngineError> {
        let mut session = self.launcher.launch().await?;
        let report = self.analyze_with(&mut session, url, minimum_items).await;
        session.close().await;

        info!(
            url,
            primary_type = ?report.scores.primary_type,
            products = report.products.len(),
            menu_items = report.menu_items.len(),
            "Site analysis complete"
        );
        Ok(report)
    }

    async fn analyze_with(
        &self,
        session: &mut L::Session,
        url: &str,
        minimum_items: usize,
    ) -> SiteReport {
        let page = render_once(session, url).await;

        let scores = page
            .as_ref()
            .map(detect_page)
            .unwrap_or_else(|| detection::score(DetectionSignals::default()));
        let plan = derive_extraction_plan(&scores);

        let mut products = Vec::new();
        let mut crawl = MenuCrawl::default();
        if let Some(page) = &page {
            for extractor in plan.extractor_order() {
                match extractor {
                    Extractor::Catalogue => products = catalogue_page(page),
                    Extractor::Menu => {
                        crawl = extraction::crawl_menu(
                            session,
                            &page.final_url,
                            self.crawl.max_pages,
                            self.crawl.link_sample,
                        )
                        .await
                    }
                }
            }
        }

        let threshold = self.crawl.quality_threshold;
        let catalogue_quality = plan
            .runs_catalogue()
            .then(|| validate_with_threshold(&products, minimum_items, threshold));
        let menu_quality = plan
            .runs_menu()
            .then(|| validate_with_threshold(&crawl.items, minimum_items, threshold));

        if plan.extraction_type == PrimaryType::None {
            info!(url, "No catalogue or menu evidence; nothing extracted");
        }

        SiteReport {
            url: url.to_string(),
            final_url: page.map(|p| p.final_url),
            scores,
            plan,
            products,
            menu_items: crawl.items,
            catalogue_quality,
            menu_quality,
            analyzed_at: Utc::now(),
        }
    }
}

async fn render_once<S: PageSession + ?Sized>(session: &mut S, url: &str) -> Option<RenderedPage> {
    match session.render(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            warn!("Render of {} failed: {}", url, e);
            None
        }
    }
}

fn detect_page(page: &RenderedPage) -> DetectionScores {
    detection::detect(&PageView::new(page))
}

fn catalogue_page(page: &RenderedPage) -> Vec<ExtractedProduct> {
    extraction::extract_products(&PageView::new(page))
}

fn menu_page(page: &RenderedPage) -> Vec<ExtractedMenuItem> {
    extraction::extract_menu_items(&PageView::new(page))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::scrapers::RenderError;

    struct FailingSession {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageSession for FailingSession {
        async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError> {
            Err(RenderError::Timeout {
                url: url.to_string(),
                secs: 30,
            })
        }

        async fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingLauncher {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SessionLauncher for FailingLauncher {
        type Session = FailingSession;

        async fn launch(&self) -> Result<FailingSession, EngineError> {
            Ok(FailingSession {
                closed: self.closed.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_render_failures_are_absorbed_and_sessions_closed() {
        let closed = Arc::new(AtomicUsize::new(0));
        let engine = Engine::with_launcher(
            FailingLauncher {
                closed: closed.clone(),
            },
            CrawlConfig::default(),
        );

        let scores = engine.detect_site_type("https://down.example/").await.unwrap();
        assert_eq!(scores.primary_type, PrimaryType::None);
        assert_eq!(scores.confidence, 0.0);

        assert!(engine
            .extract_catalogue_items("https://down.example/")
            .await
            .unwrap()
            .is_empty());
        assert!(engine
            .extract_menu_items("https://down.example/")
            .await
            .unwrap()
            .is_empty());
        assert!(engine
            .extract_menu_items_multi_page("https://down.example/menu", 3)
            .await
            .unwrap()
            .is_empty());

        let report = engine.analyze_site("https://down.example/", 5).await.unwrap();
        assert!(report.final_url.is_none());
        assert!(report.catalogue_quality.is_none());
        assert!(report.menu_quality.is_none());

        assert_eq!(closed.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_error_messages() {
        let err = EngineError::Launch("no chrome".to_string());
        assert_eq!(err.to_string(), "Browser launch failed: no chrome");
    }
}
