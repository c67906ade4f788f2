//! Post-extraction self-assessment.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::extraction::{ExtractedMenuItem, ExtractedProduct, MultiPageMenuItem};

/// Score an item set must reach to pass, on a 0-100 scale.
pub const DEFAULT_PASS_THRESHOLD: f64 = 60.0;

const COUNT_WEIGHT: f64 = 50.0;
const PRICE_WEIGHT: f64 = 30.0;
const DESCRIPTION_WEIGHT: f64 = 20.0;

/// Fields the validator inspects on any extracted item.
pub trait QualityItem {
    fn has_price(&self) -> bool;
    fn has_description(&self) -> bool;
    fn source_url(&self) -> &str;
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl QualityItem for ExtractedProduct {
    fn has_price(&self) -> bool {
        present(&self.price)
    }

    fn has_description(&self) -> bool {
        present(&self.description)
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }
}

impl QualityItem for ExtractedMenuItem {
    fn has_price(&self) -> bool {
        present(&self.price)
    }

    fn has_description(&self) -> bool {
        present(&self.description)
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }
}

impl QualityItem for MultiPageMenuItem {
    fn has_price(&self) -> bool {
        self.item.has_price()
    }

    fn has_description(&self) -> bool {
        self.item.has_description()
    }

    fn source_url(&self) -> &str {
        &self.item.source_url
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// 0-100.
    pub score: f64,
    pub passed: bool,
    pub item_count: usize,
    pub minimum_items: usize,
    pub price_coverage: f64,
    pub description_coverage: f64,
    /// Distinct source pages among the items.
    pub pages_visited: usize,
}

/// Assess an item set against [`DEFAULT_PASS_THRESHOLD`].
pub fn validate_extraction_quality<T: QualityItem>(
    items: &[T],
    minimum_items: usize,
) -> QualityAssessment {
    validate_with_threshold(items, minimum_items, DEFAULT_PASS_THRESHOLD)
}

/// Assess an item set: count adequacy dominates, then price and
/// description coverage. Passing needs both the count floor and the
/// threshold, so many bare items still fail.
pub fn validate_with_threshold<T: QualityItem>(
    items: &[T],
    minimum_items: usize,
    threshold: f64,
) -> QualityAssessment {
    let item_count = items.len();

    let count_adequacy = if minimum_items == 0 {
        1.0
    } else {
        (item_count as f64 / minimum_items as f64).min(1.0)
    };

    let coverage = |predicate: fn(&T) -> bool| {
        if item_count == 0 {
            0.0
        } else {
            items.iter().filter(|item| predicate(item)).count() as f64 / item_count as f64
        }
    };
    let price_coverage = coverage(T::has_price);
    let description_coverage = coverage(T::has_description);

    let score = count_adequacy * COUNT_WEIGHT
        + price_coverage * PRICE_WEIGHT
        + description_coverage * DESCRIPTION_WEIGHT;

    let pages_visited = items
        .iter()
        .map(|item| item.source_url())
        .collect::<HashSet<_>>()
        .len();

    QualityAssessment {
        score,
        passed: item_count >= minimum_items && score >= threshold,
        item_count,
        minimum_items,
        price_coverage,
        description_coverage,
        pages_visited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: Option<&str>, description: Option<&str>) -> ExtractedMenuItem {
        let mut item = ExtractedMenuItem::new(name, "https://anchor.example/menu");
        item.price = price.map(str::to_string);
        item.description = description.map(str::to_string);
        item
    }

    #[test]
    fn test_empty_set_fails() {
        let items: Vec<ExtractedMenuItem> = Vec::new();
        let assessment = validate_extraction_quality(&items, 5);
        assert!(!assessment.passed);
        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.item_count, 0);
        assert_eq!(assessment.pages_visited, 0);
    }

    #[test]
    fn test_complete_set_passes() {
        let items: Vec<_> = (0..6)
            .map(|i| item(&format!("Dish {}", i), Some("9.00"), Some("Tasty")))
            .collect();
        let assessment = validate_extraction_quality(&items, 5);
        assert!(assessment.passed);
        assert!((assessment.score - 100.0).abs() < 1e-9);
        assert_eq!(assessment.pages_visited, 1);
    }

    #[test]
    fn test_quantity_without_detail_fails() {
        let items: Vec<_> = (0..50).map(|i| item(&format!("Dish {}", i), None, None)).collect();
        let assessment = validate_extraction_quality(&items, 5);
        assert_eq!(assessment.score, 50.0);
        assert!(!assessment.passed);
    }

    #[test]
    fn test_count_floor_gates_pass() {
        let items = vec![
            item("Soup", Some("5"), Some("Hot")),
            item("Pie", Some("12"), Some("Crusty")),
        ];
        let assessment = validate_extraction_quality(&items, 4);
        // 0.5 * 50 + 30 + 20
        assert!((assessment.score - 75.0).abs() < 1e-9);
        assert!(!assessment.passed);
    }

    #[test]
    fn test_zero_minimum_saturates() {
        let items = vec![item("Soup", Some("5"), None)];
        let assessment = validate_extraction_quality(&items, 0);
        assert!((assessment.score - 80.0).abs() < 1e-9);
        assert!(assessment.passed);
    }

    #[test]
    fn test_blank_fields_do_not_count() {
        let items = vec![item("Soup", Some("  "), Some(""))];
        let assessment = validate_extraction_quality(&items, 1);
        assert_eq!(assessment.price_coverage, 0.0);
        assert_eq!(assessment.description_coverage, 0.0);
    }

    #[test]
    fn test_pages_visited_counts_distinct_sources() {
        let mut second = item("Pie", Some("12"), None);
        second.source_url = "https://anchor.example/menu/mains".to_string();
        let items = vec![
            MultiPageMenuItem { item: item("Soup", Some("5"), None), page_visit: 1 },
            MultiPageMenuItem { item: item("Bread", Some("3"), None), page_visit: 1 },
            MultiPageMenuItem { item: second, page_visit: 2 },
        ];
        let assessment = validate_with_threshold(&items, 3, 70.0);
        assert_eq!(assessment.pages_visited, 2);
        assert!((assessment.score - 80.0).abs() < 1e-9);
        assert!(assessment.passed);
    }
}
