//! Evidence records produced by the signal collectors.

use serde::{Deserialize, Serialize};

/// Which classification a piece of evidence argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Catalogue,
    Menu,
}

/// Structured-data types the collector tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaType {
    Product,
    Offer,
    ItemList,
    Restaurant,
    FoodEstablishment,
    Menu,
    MenuItem,
    Organization,
    LocalBusiness,
}

impl SchemaType {
    /// Map a (prefix-stripped) `@type` tag onto a tallied type.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let schema_type = match tag {
            "Product" | "ProductGroup" | "IndividualProduct" => SchemaType::Product,
            "Offer" | "AggregateOffer" => SchemaType::Offer,
            "ItemList" | "OfferCatalog" => SchemaType::ItemList,
            "Restaurant" => SchemaType::Restaurant,
            "FoodEstablishment" | "CafeOrCoffeeShop" | "Bakery" | "BarOrPub" | "Brewery"
            | "FastFoodRestaurant" | "IceCreamShop" | "Winery" | "Distillery" => {
                SchemaType::FoodEstablishment
            }
            "Menu" => SchemaType::Menu,
            "MenuItem" => SchemaType::MenuItem,
            "Organization" | "Corporation" => SchemaType::Organization,
            "LocalBusiness" | "Store" => SchemaType::LocalBusiness,
            _ => return None,
        };
        Some(schema_type)
    }

    /// Classification this type supports, if any.
    pub fn axis(self) -> Option<Axis> {
        match self {
            SchemaType::Product | SchemaType::Offer | SchemaType::ItemList => Some(Axis::Catalogue),
            SchemaType::Restaurant
            | SchemaType::FoodEstablishment
            | SchemaType::Menu
            | SchemaType::MenuItem => Some(Axis::Menu),
            SchemaType::Organization | SchemaType::LocalBusiness => None,
        }
    }

    /// Whether one occurrence corresponds to one extractable item.
    pub fn is_item_level(self) -> bool {
        matches!(
            self,
            SchemaType::Product | SchemaType::Offer | SchemaType::MenuItem
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformCategory {
    Ecommerce,
    FoodOrdering,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomHeuristicKind {
    ProductCard,
    MenuItem,
    PriceGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDataSignal {
    pub schema_type: SchemaType,
    pub count: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSignal {
    pub category: PlatformCategory,
    pub platform: String,
    pub indicators: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlPatternSignal {
    pub kind: Axis,
    pub pattern: String,
    pub matched_url: String,
    /// True when matched on a linked page rather than the page itself.
    pub internal_link: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomSignal {
    pub kind: DomHeuristicKind,
    /// Which heuristic fired, e.g. `add_to_cart`.
    pub indicator: String,
    pub count: usize,
    pub confidence: f64,
}

/// One piece of evidence, borrowed from a [`DetectionSignals`] set.
#[derive(Debug, Clone, Copy)]
pub enum Signal<'a> {
    StructuredData(&'a StructuredDataSignal),
    PlatformFingerprint(&'a PlatformSignal),
    UrlPattern(&'a UrlPatternSignal),
    DomHeuristic(&'a DomSignal),
}

impl Signal<'_> {
    pub fn confidence(&self) -> f64 {
        match self {
            Signal::StructuredData(s) => s.confidence,
            Signal::PlatformFingerprint(s) => s.confidence,
            Signal::UrlPattern(s) => s.confidence,
            Signal::DomHeuristic(s) => s.confidence,
        }
    }
}

/// All evidence collected for one page visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSignals {
    pub structured_data: Vec<StructuredDataSignal>,
    pub platforms: Vec<PlatformSignal>,
    pub url_patterns: Vec<UrlPatternSignal>,
    pub dom_heuristics: Vec<DomSignal>,
}

impl DetectionSignals {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.structured_data.len()
            + self.platforms.len()
            + self.url_patterns.len()
            + self.dom_heuristics.len()
    }

    /// Every signal, collector by collector.
    pub fn iter(&self) -> impl Iterator<Item = Signal<'_>> {
        self.structured_data
            .iter()
            .map(Signal::StructuredData)
            .chain(self.platforms.iter().map(Signal::PlatformFingerprint))
            .chain(self.url_patterns.iter().map(Signal::UrlPattern))
            .chain(self.dom_heuristics.iter().map(Signal::DomHeuristic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_type_mapping() {
        assert_eq!(SchemaType::from_tag("Product"), Some(SchemaType::Product));
        assert_eq!(
            SchemaType::from_tag("CafeOrCoffeeShop"),
            Some(SchemaType::FoodEstablishment)
        );
        assert_eq!(SchemaType::from_tag("Store"), Some(SchemaType::LocalBusiness));
        assert_eq!(SchemaType::from_tag("BreadcrumbList"), None);
    }

    #[test]
    fn test_axis_assignment() {
        assert_eq!(SchemaType::Offer.axis(), Some(Axis::Catalogue));
        assert_eq!(SchemaType::Restaurant.axis(), Some(Axis::Menu));
        assert_eq!(SchemaType::Organization.axis(), None);
    }

    #[test]
    fn test_iter_covers_all_collectors() {
        let signals = DetectionSignals {
            structured_data: vec![StructuredDataSignal {
                schema_type: SchemaType::Product,
                count: 1,
                confidence: 0.6,
            }],
            dom_heuristics: vec![DomSignal {
                kind: DomHeuristicKind::PriceGrid,
                indicator: "currency_prices".to_string(),
                count: 8,
                confidence: 0.46,
            }],
            ..Default::default()
        };
        assert_eq!(signals.len(), 2);
        let confidences: Vec<f64> = signals.iter().map(|s| s.confidence()).collect();
        assert_eq!(confidences, vec![0.6, 0.46]);
    }
}
