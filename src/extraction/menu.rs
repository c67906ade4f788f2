//! Menu item extraction.
//!
//! Structured menus are walked recursively so each item inherits the name
//! of its closest enclosing `MenuSection`.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use super::dom;
use super::types::{ExtractedMenuItem, DEFAULT_CURRENCY};
use crate::dom::PageView;
use crate::jsonld::{self, CONTAINER_KEYS, MAX_DEPTH};

pub fn extract_menu_items(page: &PageView<'_>) -> Vec<ExtractedMenuItem> {
    let items = structured_menu_items(page);
    if !items.is_empty() {
        return items;
    }
    let cards = dom::menu_cards(page);
    if !cards.is_empty() {
        debug!(url = page.url, count = cards.len(), "Menu items read from DOM cards");
    }
    cards
}

pub fn structured_menu_items(page: &PageView<'_>) -> Vec<ExtractedMenuItem> {
    let mut found = Vec::new();
    for block in jsonld::parse_blocks(&page.document) {
        visit(&block, None, 0, page.url, &mut found);
    }

    let mut seen = HashSet::new();
    found.retain(|item| seen.insert(item.dedup_key()));
    found
}

fn visit(
    node: &Value,
    section: Option<&str>,
    depth: usize,
    source_url: &str,
    out: &mut Vec<ExtractedMenuItem>,
) {
    if depth > MAX_DEPTH {
        debug!("Menu depth limit reached");
        return;
    }

    match node {
        Value::Array(entries) => {
            for entry in entries {
                visit(entry, section, depth + 1, source_url, out);
            }
        }
        Value::Object(map) => {
            if jsonld::has_type(node, "MenuItem") {
                if let Some(item) = menu_item(node, section, source_url) {
                    out.push(item);
                }
                return;
            }

            let own = if jsonld::has_type(node, "MenuSection") {
                jsonld::text(node, "name")
            } else {
                None
            };
            let section = own.as_deref().or(section);

            for key in CONTAINER_KEYS {
                if let Some(child) = map.get(*key) {
                    visit(child, section, depth + 1, source_url, out);
                }
            }
        }
        _ => {}
    }
}

fn menu_item(node: &Value, section: Option<&str>, source_url: &str) -> Option<ExtractedMenuItem> {
    let name = jsonld::text(node, "name")?;
    let offers = jsonld::offers(node);

    let mut item = ExtractedMenuItem::new(name, source_url);
    if let Some(section) = section {
        item.section = section.to_string();
    }
    item.description = jsonld::text(node, "description");
    item.price = offers.iter().find_map(|o| jsonld::offer_price(o));
    item.currency = offers
        .iter()
        .find_map(|o| jsonld::offer_currency(o))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    item.dietary_tags = jsonld::texts(node, "suitableForDiet")
        .iter()
        .map(|diet| jsonld::strip_vocab(diet).to_string())
        .collect();
    item.options = options(node, &offers);

    Some(item)
}

/// Add-on names, or the names of several priced offers (sizes, portions).
fn options(node: &Value, offers: &[&Value]) -> Vec<String> {
    let mut names = Vec::new();

    if let Some(add_ons) = node.get("menuAddOn") {
        jsonld::walk(add_ons, &mut |entry, _| {
            if jsonld::has_type(entry, "MenuSection") {
                return;
            }
            if let Some(name) = jsonld::text(entry, "name") {
                names.push(name);
            }
        });
    }

    if names.is_empty() && offers.len() > 1 {
        names = offers.iter().filter_map(|o| jsonld::text(o, "name")).collect();
    }

    names
}
