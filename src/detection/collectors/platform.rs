//! Platform fingerprint collector: known commerce, ordering and delivery platforms.

use tracing::debug;

use crate::detection::signals::{PlatformCategory, PlatformSignal};
use crate::dom::PageView;

struct Platform {
    name: &'static str,
    category: PlatformCategory,
    indicators: &'static [&'static str],
}

const PLATFORMS: &[Platform] = &[
    // E-commerce
    Platform {
        name: "shopify",
        category: PlatformCategory::Ecommerce,
        indicators: &["cdn.shopify.com", "myshopify.com", "shopify.theme", "shopify-section"],
    },
    Platform {
        name: "woocommerce",
        category: PlatformCategory::Ecommerce,
        indicators: &["woocommerce", "wc-block", "wp-content/plugins/woocommerce"],
    },
    Platform {
        name: "bigcommerce",
        category: PlatformCategory::Ecommerce,
        indicators: &["bigcommerce.com", "cdn11.bigcommerce", "data-stencil"],
    },
    Platform {
        name: "magento",
        category: PlatformCategory::Ecommerce,
        indicators: &["mage/cookies", "magento", "mage-init"],
    },
    Platform {
        name: "squarespace-commerce",
        category: PlatformCategory::Ecommerce,
        indicators: &["squarespace-commerce", "sqs-add-to-cart", "productitem"],
    },
    Platform {
        name: "wix-stores",
        category: PlatformCategory::Ecommerce,
        indicators: &["wixstores", "wix-stores"],
    },
    Platform {
        name: "ecwid",
        category: PlatformCategory::Ecommerce,
        indicators: &["ecwid.com", "ecwid-productbrowser"],
    },
    Platform {
        name: "prestashop",
        category: PlatformCategory::Ecommerce,
        indicators: &["prestashop"],
    },
    // Direct food ordering
    Platform {
        name: "toast",
        category: PlatformCategory::FoodOrdering,
        indicators: &["toasttab.com", "toast-online-ordering"],
    },
    Platform {
        name: "chownow",
        category: PlatformCategory::FoodOrdering,
        indicators: &["chownow.com", "chownow"],
    },
    Platform {
        name: "flipdish",
        category: PlatformCategory::FoodOrdering,
        indicators: &["flipdish.com", "flipdish"],
    },
    Platform {
        name: "gloriafood",
        category: PlatformCategory::FoodOrdering,
        indicators: &["gloriafood", "fbgcdn.com"],
    },
    Platform {
        name: "slerp",
        category: PlatformCategory::FoodOrdering,
        indicators: &["slerp.com"],
    },
    Platform {
        name: "square-online-ordering",
        category: PlatformCategory::FoodOrdering,
        indicators: &["squareup.com/online-ordering", "square.site"],
    },
    Platform {
        name: "menufy",
        category: PlatformCategory::FoodOrdering,
        indicators: &["menufy.com"],
    },
    // Delivery marketplaces
    Platform {
        name: "deliveroo",
        category: PlatformCategory::Delivery,
        indicators: &["deliveroo.co.uk", "deliveroo.com", "deliveroo"],
    },
    Platform {
        name: "uber-eats",
        category: PlatformCategory::Delivery,
        indicators: &["ubereats.com", "uber eats"],
    },
    Platform {
        name: "just-eat",
        category: PlatformCategory::Delivery,
        indicators: &["just-eat.co.uk", "just-eat.com", "justeat"],
    },
    Platform {
        name: "doordash",
        category: PlatformCategory::Delivery,
        indicators: &["doordash.com"],
    },
    Platform {
        name: "grubhub",
        category: PlatformCategory::Delivery,
        indicators: &["grubhub.com"],
    },
];

/// Confidence for a platform with `matched` indicators present.
pub fn confidence(matched: usize) -> f64 {
    (0.4 + matched as f64 * 0.2).min(0.95)
}

pub fn collect(page: &PageView<'_>) -> Vec<PlatformSignal> {
    let haystack = format!("{}\n{}", page.url, page.html).to_lowercase();

    PLATFORMS
        .iter()
        .filter_map(|platform| {
            let indicators: Vec<String> = platform
                .indicators
                .iter()
                .filter(|indicator| haystack.contains(*indicator))
                .map(|indicator| indicator.to_string())
                .collect();
            if indicators.is_empty() {
                return None;
            }
            debug!(platform = platform.name, ?indicators, "Platform fingerprint matched");
            Some(PlatformSignal {
                category: platform.category,
                platform: platform.name.to_string(),
                confidence: confidence(indicators.len()),
                indicators,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_fingerprint() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="https://cdn.shopify.com/s/files/theme.css">
            <script>window.Shopify = {}; Shopify.theme = {};</script>
        </head><body></body></html>"#;
        let view = PageView::from_parts("https://store.example/", html);
        let signals = collect(&view);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].platform, "shopify");
        assert_eq!(signals[0].category, PlatformCategory::Ecommerce);
        assert_eq!(signals[0].indicators.len(), 2);
        assert!((signals[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_url_counts_as_evidence() {
        let view = PageView::from_parts(
            "https://www.deliveroo.co.uk/menu/london/the-anchor",
            "<html></html>",
        );
        let signals = collect(&view);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].category, PlatformCategory::Delivery);
    }

    #[test]
    fn test_confidence_capped() {
        assert_eq!(confidence(10), 0.95);
    }

    #[test]
    fn test_no_platform() {
        let view = PageView::from_parts("https://plain.example/", "<p>Hello</p>");
        assert!(collect(&view).is_empty());
    }
}
