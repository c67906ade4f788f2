//! Normalized item records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Currency assumed when a page does not declare one.
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Section assigned to menu items with no enclosing section.
pub const DEFAULT_SECTION: &str = "Menu";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Available,
    Limited,
    Unavailable,
}

impl Availability {
    /// Map a schema.org availability value (prefix already stripped).
    pub fn from_schema(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "limitedavailability" | "backorder" | "preorder" | "presale" => {
                Availability::Limited
            }
            "outofstock" | "soldout" | "discontinued" => Availability::Unavailable,
            _ => Availability::Available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProduct {
    pub title: String,
    pub description: Option<String>,
    /// Raw price text; never coerced to a number.
    pub price: Option<String>,
    pub currency: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub availability: Availability,
    pub variants: Vec<String>,
    pub source_url: String,
    pub tags: BTreeMap<String, String>,
}

impl ExtractedProduct {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            price: None,
            currency: DEFAULT_CURRENCY.to_string(),
            category: None,
            image_url: None,
            availability: Availability::default(),
            variants: Vec::new(),
            source_url: source_url.into(),
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub currency: String,
    pub section: String,
    pub dietary_tags: Vec<String>,
    pub options: Vec<String>,
    pub source_url: String,
}

impl ExtractedMenuItem {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            price: None,
            currency: DEFAULT_CURRENCY.to_string(),
            section: DEFAULT_SECTION.to_string(),
            dietary_tags: Vec::new(),
            options: Vec::new(),
            source_url: source_url.into(),
        }
    }

    /// Identity used to drop repeats across a crawl.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.name.to_lowercase(),
            self.section.to_lowercase(),
            self.source_url.clone(),
        )
    }
}

/// A menu item found during a crawl, tagged with the visit that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPageMenuItem {
    #[serde(flatten)]
    pub item: ExtractedMenuItem,
    /// 1-based ordinal of the page visit.
    pub page_visit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_mapping() {
        assert_eq!(Availability::from_schema("InStock"), Availability::Available);
        assert_eq!(
            Availability::from_schema("LimitedAvailability"),
            Availability::Limited
        );
        assert_eq!(Availability::from_schema("OutOfStock"), Availability::Unavailable);
        assert_eq!(Availability::from_schema("SomethingNew"), Availability::Available);
    }

    #[test]
    fn test_defaults() {
        let product = ExtractedProduct::new("Mug", "https://shop.example/");
        assert_eq!(product.currency, "GBP");
        assert_eq!(product.availability, Availability::Available);

        let item = ExtractedMenuItem::new("Soup", "https://anchor.example/menu");
        assert_eq!(item.section, "Menu");
        assert_eq!(item.currency, "GBP");
    }

    #[test]
    fn test_multi_page_item_serializes_flat() {
        let entry = MultiPageMenuItem {
            item: ExtractedMenuItem::new("Soup", "https://anchor.example/menu"),
            page_visit: 2,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["name"], "Soup");
        assert_eq!(value["page_visit"], 2);
    }
}
