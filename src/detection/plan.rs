//! Extraction planning from detection scores.

use serde::{Deserialize, Serialize};

use super::scorer::{DetectionScores, PrimaryType};
use super::signals::{DetectionSignals, DomHeuristicKind};

/// Lower bound on the item estimate so crawls are not under-provisioned.
pub const MIN_ESTIMATED_ITEMS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    CatalogueFirst,
    MenuFirst,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Catalogue,
    Menu,
}

/// Which extractors to run, in what order, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    #[serde(rename = "type")]
    pub extraction_type: PrimaryType,
    pub priority: Priority,
    pub confidence: f64,
    pub rationale: String,
    pub estimated_items: usize,
}

impl ExtractionPlan {
    pub fn runs_catalogue(&self) -> bool {
        matches!(
            self.extraction_type,
            PrimaryType::Catalogue | PrimaryType::Hybrid
        )
    }

    pub fn runs_menu(&self) -> bool {
        matches!(self.extraction_type, PrimaryType::Menu | PrimaryType::Hybrid)
    }

    /// Extractors to run, menu first only when the priority says so.
    pub fn extractor_order(&self) -> Vec<Extractor> {
        let mut order: Vec<Extractor> = [
            (Extractor::Catalogue, self.runs_catalogue()),
            (Extractor::Menu, self.runs_menu()),
        ]
        .into_iter()
        .filter_map(|(extractor, runs)| runs.then_some(extractor))
        .collect();
        if self.priority == Priority::MenuFirst {
            order.reverse();
        }
        order
    }
}

pub fn derive_extraction_plan(scores: &DetectionScores) -> ExtractionPlan {
    let priority = match scores.primary_type {
        PrimaryType::Hybrid if scores.score_catalogue > scores.score_menu => {
            Priority::CatalogueFirst
        }
        PrimaryType::Hybrid => Priority::MenuFirst,
        _ => Priority::Parallel,
    };

    ExtractionPlan {
        extraction_type: scores.primary_type,
        priority,
        confidence: scores.confidence,
        rationale: rationale(&scores.signals),
        estimated_items: estimate_items(&scores.signals),
    }
}

fn estimate_items(signals: &DetectionSignals) -> usize {
    let structured: usize = signals
        .structured_data
        .iter()
        .filter(|s| s.schema_type.is_item_level())
        .map(|s| s.count)
        .sum();

    let dom = signals
        .dom_heuristics
        .iter()
        .filter(|s| {
            matches!(
                s.kind,
                DomHeuristicKind::ProductCard | DomHeuristicKind::MenuItem
            )
        })
        .map(|s| s.count)
        .max()
        .unwrap_or(0);

    structured.max(dom).max(MIN_ESTIMATED_ITEMS)
}

fn rationale(signals: &DetectionSignals) -> String {
    let mut parts = Vec::new();

    if !signals.structured_data.is_empty() {
        let types: Vec<String> = signals
            .structured_data
            .iter()
            .map(|s| format!("{:?}x{}", s.schema_type, s.count))
            .collect();
        parts.push(format!("structured data: {}", types.join(", ")));
    }

    if !signals.platforms.is_empty() {
        let platforms: Vec<String> = signals
            .platforms
            .iter()
            .map(|s| format!("{} ({:?})", s.platform, s.category))
            .collect();
        parts.push(format!("platforms: {}", platforms.join(", ")));
    }

    if !signals.url_patterns.is_empty() {
        let patterns: Vec<&str> = signals
            .url_patterns
            .iter()
            .map(|s| s.pattern.as_str())
            .collect();
        parts.push(format!("url patterns: {}", patterns.join(", ")));
    }

    if !signals.dom_heuristics.is_empty() {
        let dom: Vec<String> = signals
            .dom_heuristics
            .iter()
            .map(|s| format!("{}x{}", s.indicator, s.count))
            .collect();
        parts.push(format!("dom: {}", dom.join(", ")));
    }

    if parts.is_empty() {
        "no signals detected".to_string()
    } else {
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::scorer::score;
    use crate::detection::signals::*;

    #[test]
    fn test_empty_plan() {
        let plan = derive_extraction_plan(&score(DetectionSignals::default()));
        assert_eq!(plan.extraction_type, PrimaryType::None);
        assert_eq!(plan.priority, Priority::Parallel);
        assert_eq!(plan.estimated_items, MIN_ESTIMATED_ITEMS);
        assert_eq!(plan.rationale, "no signals detected");
        assert!(!plan.runs_catalogue() && !plan.runs_menu());
        assert!(plan.extractor_order().is_empty());
    }

    #[test]
    fn test_estimate_uses_largest_source() {
        let signals = DetectionSignals {
            structured_data: vec![
                StructuredDataSignal {
                    schema_type: SchemaType::Product,
                    count: 14,
                    confidence: 0.9,
                },
                StructuredDataSignal {
                    schema_type: SchemaType::Offer,
                    count: 14,
                    confidence: 0.9,
                },
                StructuredDataSignal {
                    schema_type: SchemaType::ItemList,
                    count: 1,
                    confidence: 0.6,
                },
            ],
            dom_heuristics: vec![DomSignal {
                kind: DomHeuristicKind::ProductCard,
                indicator: "price_card".to_string(),
                count: 20,
                confidence: 0.85,
            }],
            ..Default::default()
        };
        assert_eq!(estimate_items(&signals), 28);
    }

    #[test]
    fn test_hybrid_priority_follows_stronger_axis() {
        let mut scores = score(DetectionSignals::default());
        scores.primary_type = PrimaryType::Hybrid;
        scores.score_catalogue = 0.7;
        scores.score_menu = 0.8;
        assert_eq!(derive_extraction_plan(&scores).priority, Priority::MenuFirst);

        scores.score_catalogue = 0.85;
        let plan = derive_extraction_plan(&scores);
        assert_eq!(plan.priority, Priority::CatalogueFirst);
        assert!(plan.runs_catalogue() && plan.runs_menu());
    }

    #[test]
    fn test_extractor_order_follows_priority() {
        let mut scores = score(DetectionSignals::default());
        scores.primary_type = PrimaryType::Hybrid;
        scores.score_catalogue = 0.7;
        scores.score_menu = 0.8;
        assert_eq!(
            derive_extraction_plan(&scores).extractor_order(),
            vec![Extractor::Menu, Extractor::Catalogue]
        );

        scores.score_catalogue = 0.85;
        assert_eq!(
            derive_extraction_plan(&scores).extractor_order(),
            vec![Extractor::Catalogue, Extractor::Menu]
        );

        scores.primary_type = PrimaryType::Menu;
        assert_eq!(
            derive_extraction_plan(&scores).extractor_order(),
            vec![Extractor::Menu]
        );
    }

    #[test]
    fn test_rationale_summarizes_categories() {
        let signals = DetectionSignals {
            platforms: vec![PlatformSignal {
                category: PlatformCategory::FoodOrdering,
                platform: "flipdish".to_string(),
                indicators: vec!["flipdish".to_string()],
                confidence: 0.6,
            }],
            url_patterns: vec![UrlPatternSignal {
                kind: Axis::Menu,
                pattern: "/menu".to_string(),
                matched_url: "https://x.example/menu".to_string(),
                internal_link: false,
                confidence: 0.95,
            }],
            ..Default::default()
        };
        assert_eq!(
            rationale(&signals),
            "platforms: flipdish (FoodOrdering); url patterns: /menu"
        );
    }
}
