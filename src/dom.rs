//! Read-only DOM view over a rendered page.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::scrapers::RenderedPage;

/// Currency-prefixed price, e.g. `£12.50`, `$ 9`, `€4,95`.
pub static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[£$€]\s?\d{1,5}(?:[.,]\d{1,2})?").expect("valid price regex"));

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid body selector"));

/// A parsed page: final URL, raw markup and a queryable document.
///
/// `Html` is not `Send`, so a view must never be held across an `.await`.
pub struct PageView<'a> {
    pub url: &'a str,
    pub html: &'a str,
    pub document: Html,
}

impl<'a> PageView<'a> {
    pub fn new(page: &'a RenderedPage) -> Self {
        Self::from_parts(&page.final_url, &page.html)
    }

    pub fn from_parts(url: &'a str, html: &'a str) -> Self {
        Self {
            url,
            html,
            document: Html::parse_document(html),
        }
    }

    /// Visible body text (falls back to the whole document).
    pub fn body_text(&self) -> String {
        match self.document.select(&BODY_SELECTOR).next() {
            Some(body) => text_without_scripts(body),
            None => text_without_scripts(self.document.root_element()),
        }
    }

    /// Same-host links found on the page, in document order, deduplicated,
    /// fragments removed, capped at `limit`.
    pub fn internal_links(&self, limit: usize) -> Vec<String> {
        let Ok(base) = Url::parse(self.url) else {
            return Vec::new();
        };
        let Some(base_host) = base.host_str().map(comparable_host) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in self.document.select(&LINK_SELECTOR) {
            if links.len() >= limit {
                break;
            }
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim();

            // Skip empty, javascript, mailto, tel links
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                continue;
            }

            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            if resolved.host_str().map(comparable_host) != Some(base_host.clone()) {
                continue;
            }

            let normalized = normalize_url(resolved.as_str());
            if seen.insert(normalized.clone()) {
                links.push(normalized);
            }
        }

        links
    }
}

/// Drop the fragment so `#section` anchors do not look like new pages.
pub fn normalize_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Lowercased path of a URL, or empty when it does not parse.
pub fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default()
}

/// Resolve a possibly relative reference against the page URL.
pub fn resolve_url(base: &str, reference: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(reference))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| reference.to_string())
}

fn comparable_host(host: &str) -> String {
    let host = host.to_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Text directly owned by an element, excluding descendants.
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full text of an element with whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn text_without_scripts(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in root.descendants() {
        if let Some(text) = node.value().as_text() {
            let inside_script = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
                .is_some_and(|name| name == "script" || name == "style" || name == "noscript");
            if !inside_script {
                parts.push(text.trim().to_string());
            }
        }
    }
    collapse_whitespace(&parts.join(" "))
}

/// The price in `text` when every price it holds is the same one.
pub fn single_price(text: &str) -> Option<&str> {
    let mut prices = PRICE_RE.find_iter(text).map(|m| m.as_str());
    let first = prices.next()?;
    prices.all(|p| p == first).then_some(first)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}
