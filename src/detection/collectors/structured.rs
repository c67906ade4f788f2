//! Structured-data collector: tallies schema.org entity types.

use std::collections::BTreeMap;

use tracing::debug;

use crate::detection::signals::{SchemaType, StructuredDataSignal};
use crate::dom::PageView;
use crate::jsonld;

/// Confidence for `count` occurrences of one type.
pub fn confidence(count: usize) -> f64 {
    (0.5 + count as f64 * 0.1).min(0.9)
}

pub fn collect(page: &PageView<'_>) -> Vec<StructuredDataSignal> {
    let mut counts: BTreeMap<SchemaType, usize> = BTreeMap::new();

    for block in jsonld::parse_blocks(&page.document) {
        jsonld::walk(&block, &mut |node, _depth| {
            for tag in jsonld::type_tags(node) {
                if let Some(schema_type) = SchemaType::from_tag(tag) {
                    *counts.entry(schema_type).or_default() += 1;
                }
            }
        });
    }

    counts
        .into_iter()
        .map(|(schema_type, count)| {
            debug!(?schema_type, count, "Structured data type found");
            StructuredDataSignal {
                schema_type,
                count,
                confidence: confidence(count),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_blocks(blocks: &[&str]) -> String {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        format!("<html><head>{}</head><body></body></html>", scripts)
    }

    #[test]
    fn test_confidence_curve() {
        assert!((confidence(1) - 0.6).abs() < 1e-9);
        assert!((confidence(3) - 0.8).abs() < 1e-9);
        assert_eq!(confidence(10), 0.9);
    }

    #[test]
    fn test_counts_nested_menu() {
        let html = page_with_blocks(&[r#"{
            "@context": "https://schema.org",
            "@type": "Restaurant",
            "name": "The Anchor",
            "hasMenu": {
                "@type": "Menu",
                "hasMenuSection": [
                    {"@type": "MenuSection", "name": "Starters", "hasMenuItem": [
                        {"@type": "MenuItem", "name": "Soup"},
                        {"@type": "MenuItem", "name": "Bread"}
                    ]},
                    {"@type": "MenuSection", "name": "Mains", "hasMenuItem": {"@type": "MenuItem", "name": "Pie"}}
                ]
            }
        }"#]);
        let view = PageView::from_parts("https://anchor.example/", &html);
        let signals = collect(&view);

        let count_of = |t: SchemaType| {
            signals
                .iter()
                .find(|s| s.schema_type == t)
                .map(|s| s.count)
                .unwrap_or(0)
        };
        assert_eq!(count_of(SchemaType::Restaurant), 1);
        assert_eq!(count_of(SchemaType::Menu), 1);
        assert_eq!(count_of(SchemaType::MenuItem), 3);
    }

    #[test]
    fn test_malformed_block_yields_nothing() {
        let html = page_with_blocks(&[r#"{"@type": "Product", "name": "#]);
        let view = PageView::from_parts("https://shop.example/", &html);
        assert!(collect(&view).is_empty());
    }

    #[test]
    fn test_item_list_products() {
        let html = page_with_blocks(&[r#"{
            "@type": "ItemList",
            "itemListElement": [
                {"@type": "ListItem", "position": 1, "item": {"@type": "Product", "name": "Mug"}},
                {"@type": "ListItem", "position": 2, "item": {"@type": "Product", "name": "Cup"}}
            ]
        }"#]);
        let view = PageView::from_parts("https://shop.example/", &html);
        let signals = collect(&view);
        let product = signals
            .iter()
            .find(|s| s.schema_type == SchemaType::Product)
            .unwrap();
        assert_eq!(product.count, 2);
        assert!((product.confidence - 0.7).abs() < 1e-9);
    }
}
