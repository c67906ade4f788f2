//! URL pattern collector: path conventions on the page and its internal links.

use tracing::debug;

use crate::detection::signals::{Axis, UrlPatternSignal};
use crate::dom::{url_path, PageView};

/// Internal links sampled per page.
pub const INTERNAL_LINK_SAMPLE: usize = 50;

/// Discount applied to matches found on linked pages.
const INTERNAL_LINK_FACTOR: f64 = 0.8;

pub struct UrlPattern {
    pub fragment: &'static str,
    pub kind: Axis,
    pub weight: f64,
}

pub const URL_PATTERNS: &[UrlPattern] = &[
    UrlPattern { fragment: "/products", kind: Axis::Catalogue, weight: 0.9 },
    UrlPattern { fragment: "/collections", kind: Axis::Catalogue, weight: 0.9 },
    UrlPattern { fragment: "/product/", kind: Axis::Catalogue, weight: 0.85 },
    UrlPattern { fragment: "/shop", kind: Axis::Catalogue, weight: 0.85 },
    UrlPattern { fragment: "/catalog", kind: Axis::Catalogue, weight: 0.85 },
    UrlPattern { fragment: "/store", kind: Axis::Catalogue, weight: 0.8 },
    UrlPattern { fragment: "/category", kind: Axis::Catalogue, weight: 0.7 },
    UrlPattern { fragment: "/cart", kind: Axis::Catalogue, weight: 0.6 },
    UrlPattern { fragment: "/menu", kind: Axis::Menu, weight: 0.95 },
    UrlPattern { fragment: "/food", kind: Axis::Menu, weight: 0.8 },
    UrlPattern { fragment: "/dishes", kind: Axis::Menu, weight: 0.8 },
    UrlPattern { fragment: "/order-online", kind: Axis::Menu, weight: 0.8 },
    UrlPattern { fragment: "/drinks", kind: Axis::Menu, weight: 0.75 },
    UrlPattern { fragment: "/takeaway", kind: Axis::Menu, weight: 0.75 },
];

/// Patterns that match `url`'s path.
pub fn matching_patterns(url: &str) -> impl Iterator<Item = &'static UrlPattern> {
    let path = url_path(url);
    URL_PATTERNS
        .iter()
        .filter(move |pattern| path.contains(pattern.fragment))
}

/// Whether `url` looks like a menu page.
pub fn is_menu_url(url: &str) -> bool {
    matching_patterns(url).any(|p| p.kind == Axis::Menu)
}

pub fn collect(page: &PageView<'_>) -> Vec<UrlPatternSignal> {
    let mut signals: Vec<UrlPatternSignal> = matching_patterns(page.url)
        .map(|pattern| UrlPatternSignal {
            kind: pattern.kind,
            pattern: pattern.fragment.to_string(),
            matched_url: page.url.to_string(),
            internal_link: false,
            confidence: pattern.weight,
        })
        .collect();

    for link in page.internal_links(INTERNAL_LINK_SAMPLE) {
        for pattern in matching_patterns(&link) {
            let exists = signals
                .iter()
                .any(|s| s.pattern == pattern.fragment && s.kind == pattern.kind);
            if exists {
                continue;
            }
            debug!(pattern = pattern.fragment, link = %link, "URL pattern on internal link");
            signals.push(UrlPatternSignal {
                kind: pattern.kind,
                pattern: pattern.fragment.to_string(),
                matched_url: link.clone(),
                internal_link: true,
                confidence: pattern.weight * INTERNAL_LINK_FACTOR,
            });
        }
    }

    signals
}
