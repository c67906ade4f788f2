//! Embedded structured-data (JSON-LD) blocks as generic trees.
//!
//! Blocks are parsed into `serde_json::Value` and walked through a fixed set
//! of containment keys. Recursion is bounded by [`MAX_DEPTH`] so hostile or
//! absurdly nested payloads cannot blow the stack.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Maximum nesting followed when walking a structured-data tree.
pub const MAX_DEPTH: usize = 32;

/// Keys that hold contained entities (list wrappers, menus, sections, items).
pub const CONTAINER_KEYS: &[&str] = &[
    "@graph",
    "itemListElement",
    "item",
    "mainEntity",
    "hasMenu",
    "menu",
    "hasMenuSection",
    "hasMenuItem",
];

static JSONLD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid JSON-LD selector")
});

/// Parse every structured-data block on the page, skipping malformed ones.
pub fn parse_blocks(document: &Html) -> Vec<Value> {
    document
        .select(&JSONLD_SELECTOR)
        .filter_map(|script| parse_block(&script.text().collect::<String>()))
        .collect()
}

/// Parse one block. Returns `None` for anything that is not valid JSON.
pub fn parse_block(raw: &str) -> Option<Value> {
    let trimmed = raw
        .trim()
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim()
        .trim_end_matches(';');
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Skipping malformed structured-data block: {}", e);
            None
        }
    }
}

/// Strip a schema.org vocabulary prefix (`https://schema.org/InStock` -> `InStock`).
pub fn strip_vocab(value: &str) -> &str {
    let value = value.trim();
    for prefix in [
        "https://schema.org/",
        "http://schema.org/",
        "https://www.schema.org/",
        "http://www.schema.org/",
        "schema:",
    ] {
        if let Some(rest) = value.strip_prefix(prefix) {
            return rest;
        }
    }
    value
}

/// The node's `@type` tags, prefix-stripped. Handles string and array forms.
pub fn type_tags(node: &Value) -> Vec<&str> {
    match node.get("@type") {
        Some(Value::String(s)) => vec![strip_vocab(s)],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(strip_vocab)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn has_type(node: &Value, tag: &str) -> bool {
    type_tags(node).contains(&tag)
}

/// Visit every object node reachable through arrays and [`CONTAINER_KEYS`].
///
/// The visitor receives each node with its depth; descent stops at
/// [`MAX_DEPTH`].
pub fn walk<'a, F>(root: &'a Value, visit: &mut F)
where
    F: FnMut(&'a Value, usize),
{
    walk_at(root, 0, visit);
}

fn walk_at<'a, F>(node: &'a Value, depth: usize, visit: &mut F)
where
    F: FnMut(&'a Value, usize),
{
    if depth > MAX_DEPTH {
        debug!("Structured-data depth limit reached");
        return;
    }
    match node {
        Value::Array(items) => {
            for item in items {
                walk_at(item, depth + 1, visit);
            }
        }
        Value::Object(map) => {
            visit(node, depth);
            for key in CONTAINER_KEYS {
                if let Some(child) = map.get(*key) {
                    walk_at(child, depth + 1, visit);
                }
            }
        }
        _ => {}
    }
}

/// Human-readable text of a field: strings, numbers, `{name}`/`{@value}`
/// objects, or the first usable entry of an array.
pub fn text(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(value_text)
}

pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("@value"))
            .and_then(value_text),
        Value::Array(items) => items.iter().find_map(value_text),
        _ => None,
    }
}

/// Every usable text in a field that may be a single value or an array.
pub fn texts(node: &Value, key: &str) -> Vec<String> {
    match node.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
        Some(value) => value_text(value).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Offers of a product or menu item, normalized to a list of objects.
pub fn offers(node: &Value) -> Vec<&Value> {
    match node.get("offers") {
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
        Some(offer @ Value::Object(_)) => vec![offer],
        _ => Vec::new(),
    }
}

/// Price of an offer as a raw string (`price`, `lowPrice`, or a price specification).
pub fn offer_price(offer: &Value) -> Option<String> {
    text(offer, "price")
        .or_else(|| text(offer, "lowPrice"))
        .or_else(|| offer.get("priceSpecification").and_then(|spec| {
            match spec {
                Value::Array(specs) => specs.iter().find_map(|s| text(s, "price")),
                other => text(other, "price"),
            }
        }))
}

/// Currency of an offer, if declared.
pub fn offer_currency(offer: &Value) -> Option<String> {
    text(offer, "priceCurrency").or_else(|| {
        offer
            .get("priceSpecification")
            .and_then(|spec| text(spec, "priceCurrency"))
    })
}
