//! Product extraction from structured data, with a DOM card fallback.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use super::dom;
use super::types::{Availability, ExtractedProduct, DEFAULT_CURRENCY};
use crate::dom::{resolve_url, PageView};
use crate::jsonld;

const PRODUCT_TYPES: &[&str] = &["Product", "ProductGroup", "IndividualProduct"];
const OFFER_TYPES: &[&str] = &["Offer", "AggregateOffer"];

/// Structured-data keys copied into a product's tags.
const TAG_KEYS: &[&str] = &[
    "sku", "mpn", "gtin", "gtin8", "gtin12", "gtin13", "gtin14", "brand", "color", "material",
];

/// Extract every product on a parsed page.
///
/// Structured data wins; product cards are only read when the page
/// declares no products at all.
pub fn extract_products(page: &PageView<'_>) -> Vec<ExtractedProduct> {
    let products = structured_products(page);
    if !products.is_empty() {
        return products;
    }
    let cards = dom::product_cards(page);
    if !cards.is_empty() {
        debug!(url = page.url, count = cards.len(), "Products read from DOM cards");
    }
    cards
}

pub fn structured_products(page: &PageView<'_>) -> Vec<ExtractedProduct> {
    let mut products = Vec::new();
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();

    for block in jsonld::parse_blocks(&page.document) {
        jsonld::walk(&block, &mut |node, _depth| {
            let tags = jsonld::type_tags(node);
            let product = if tags.iter().any(|t| PRODUCT_TYPES.contains(t)) {
                product_from_node(node, page.url)
            } else if tags.iter().any(|t| OFFER_TYPES.contains(t)) {
                product_from_offer(node, page.url)
            } else {
                None
            };

            if let Some(product) = product {
                if seen.insert((product.title.clone(), product.price.clone())) {
                    products.push(product);
                }
            }
        });
    }

    products
}

fn product_from_node(node: &Value, source_url: &str) -> Option<ExtractedProduct> {
    let title = jsonld::text(node, "name")?;
    let offers = jsonld::offers(node);

    let mut product = ExtractedProduct::new(title, source_url);
    product.description = jsonld::text(node, "description");
    product.category = jsonld::text(node, "category");
    product.image_url = image_of(node).map(|src| resolve_url(source_url, &src));
    apply_offers(&mut product, &offers);

    product.variants = match node.get("hasVariant") {
        Some(Value::Array(variants)) => variants
            .iter()
            .filter_map(|v| jsonld::text(v, "name"))
            .collect(),
        _ if offers.len() > 1 => offers
            .iter()
            .filter_map(|o| jsonld::text(o, "name"))
            .collect(),
        _ => Vec::new(),
    };

    for key in TAG_KEYS {
        if let Some(value) = jsonld::text(node, key) {
            product.tags.insert(key.to_string(), value);
        }
    }

    Some(product)
}

/// A stand-alone offer describes the product it sells through `itemOffered`.
fn product_from_offer(offer: &Value, source_url: &str) -> Option<ExtractedProduct> {
    let item = offer.get("itemOffered");
    let title = item
        .and_then(|i| jsonld::text(i, "name"))
        .or_else(|| jsonld::text(offer, "name"))?;

    let mut product = ExtractedProduct::new(title, source_url);
    product.description = item
        .and_then(|i| jsonld::text(i, "description"))
        .or_else(|| jsonld::text(offer, "description"));
    product.category = jsonld::text(offer, "category");
    product.image_url = item
        .and_then(image_of)
        .or_else(|| image_of(offer))
        .map(|src| resolve_url(source_url, &src));
    apply_offers(&mut product, &[offer]);

    Some(product)
}

fn apply_offers(product: &mut ExtractedProduct, offers: &[&Value]) {
    product.price = offers.iter().find_map(|o| jsonld::offer_price(o));
    product.currency = offers
        .iter()
        .find_map(|o| jsonld::offer_currency(o))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    product.availability = offers
        .iter()
        .find_map(|o| jsonld::text(o, "availability"))
        .map(|a| Availability::from_schema(jsonld::strip_vocab(&a)))
        .unwrap_or_default();
}

fn image_of(node: &Value) -> Option<String> {
    fn image_value(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Array(items) => items.iter().find_map(image_value),
            Value::Object(map) => map
                .get("url")
                .or_else(|| map.get("contentUrl"))
                .and_then(image_value),
            _ => None,
        }
    }
    node.get("image").and_then(image_value)
}
