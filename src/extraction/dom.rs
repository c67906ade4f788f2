//! Card-based extraction for pages that declare no structured items.
//!
//! A card is an element whose class carries a product or menu hint, whose
//! text holds exactly one distinct price, and which contains a name.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::types::{ExtractedMenuItem, ExtractedProduct, DEFAULT_CURRENCY, DEFAULT_SECTION};
use crate::detection::collectors::dom::PRODUCT_CLASS_HINTS;
use crate::dom::{element_text, resolve_url, single_price, PageView, PRICE_RE};

pub const MENU_CLASS_HINTS: &[&str] = &["menu-item", "menu_item", "menuitem", "dish", "food-item"];

/// Headings longer than this are prose, not section titles.
const MAX_SECTION_LEN: usize = 60;

static NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3, h4, h5, h6, [class*=name], [class*=title], strong, b, a")
        .expect("valid name selector")
});

static DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*=desc], p").expect("valid description selector")
});

static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid image selector"));

/// Dietary markers as printed on menus, mapped to schema.org diet names.
const DIETARY_LABELS: &[(&str, &str)] = &[
    ("(vg)", "VeganDiet"),
    ("(ve)", "VeganDiet"),
    ("vegan", "VeganDiet"),
    ("(v)", "VegetarianDiet"),
    ("vegetarian", "VegetarianDiet"),
    ("(gf)", "GlutenFreeDiet"),
    ("gluten free", "GlutenFreeDiet"),
    ("gluten-free", "GlutenFreeDiet"),
    ("(df)", "DairyFreeDiet"),
    ("dairy free", "DairyFreeDiet"),
    ("dairy-free", "DairyFreeDiet"),
];

fn has_class_hint(element: ElementRef<'_>, hints: &[&str]) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| {
            let class = class.to_lowercase();
            hints.iter().any(|hint| class.contains(hint))
        })
        .unwrap_or(false)
}

/// Split `£12.50` into (`12.50`, `GBP`).
pub fn split_price(raw: &str) -> (String, String) {
    let currency = match raw.chars().next() {
        Some('$') => "USD",
        Some('€') => "EUR",
        Some('£') => "GBP",
        _ => DEFAULT_CURRENCY,
    };
    let amount = raw
        .trim_start_matches(['£', '$', '€'])
        .trim()
        .to_string();
    (amount, currency.to_string())
}

fn card_name(card: ElementRef<'_>) -> Option<String> {
    card.select(&NAME_SELECTOR)
        .map(element_text)
        .find(|text| !text.is_empty() && !PRICE_RE.is_match(text))
}

fn card_description(card: ElementRef<'_>, name: &str) -> Option<String> {
    card.select(&DESCRIPTION_SELECTOR)
        .map(element_text)
        .map(|text| PRICE_RE.replace_all(&text, "").trim().to_string())
        .find(|text| !text.is_empty() && text != name)
}

/// Diet names implied by markers in a block of text, deduplicated.
pub fn dietary_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (marker, label) in DIETARY_LABELS {
        if lower.contains(marker) && !tags.iter().any(|t| t == label) {
            tags.push(label.to_string());
        }
    }
    tags
}

/// Product cards: product class hint, one price, a title.
pub fn product_cards(page: &PageView<'_>) -> Vec<ExtractedProduct> {
    let mut products = Vec::new();
    let mut seen = HashSet::new();

    for node in page.document.root_element().descendants() {
        let Some(card) = ElementRef::wrap(node) else {
            continue;
        };
        if !has_class_hint(card, PRODUCT_CLASS_HINTS) {
            continue;
        }
        let text = element_text(card);
        let Some(raw_price) = single_price(&text) else {
            continue;
        };
        let Some(title) = card_name(card) else {
            continue;
        };

        let (price, currency) = split_price(raw_price);
        if !seen.insert((title.clone(), price.clone())) {
            continue;
        }

        let mut product = ExtractedProduct::new(title, page.url);
        product.description = card_description(card, &product.title);
        product.price = Some(price);
        product.currency = currency;
        product.image_url = card
            .select(&IMAGE_SELECTOR)
            .next()
            .and_then(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
            .map(|src| resolve_url(page.url, src));
        products.push(product);
    }

    products
}

fn inside_menu_card(element: ElementRef<'_>) -> bool {
    has_class_hint(element, MENU_CLASS_HINTS)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| has_class_hint(a, MENU_CLASS_HINTS))
}

/// Menu cards in document order, each assigned to the nearest preceding
/// section heading outside any card.
pub fn menu_cards(page: &PageView<'_>) -> Vec<ExtractedMenuItem> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut section = DEFAULT_SECTION.to_string();

    for node in page.document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        if matches!(element.value().name(), "h2" | "h3" | "h4") && !inside_menu_card(element) {
            let heading = element_text(element);
            if !heading.is_empty() && heading.chars().count() <= MAX_SECTION_LEN {
                section = heading;
            }
            continue;
        }

        if !has_class_hint(element, MENU_CLASS_HINTS) {
            continue;
        }
        let text = element_text(element);
        let Some(raw_price) = single_price(&text) else {
            continue;
        };
        let Some(name) = card_name(element) else {
            continue;
        };

        let mut item = ExtractedMenuItem::new(name, page.url);
        item.section = section.clone();
        if !seen.insert(item.dedup_key()) {
            continue;
        }

        let (price, currency) = split_price(raw_price);
        item.description = card_description(element, &item.name);
        item.price = Some(price);
        item.currency = currency;
        item.dietary_tags = dietary_tags(&text);
        items.push(item);
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_price() {
        assert_eq!(split_price("£12.50"), ("12.50".to_string(), "GBP".to_string()));
        assert_eq!(split_price("$ 9"), ("9".to_string(), "USD".to_string()));
        assert_eq!(split_price("€4,95"), ("4,95".to_string(), "EUR".to_string()));
    }

    #[test]
    fn test_product_cards() {
        let html = r#"<html><body>
            <div class="product-card">
                <img src="/img/mug.jpg">
                <h3>Stoneware Mug</h3>
                <p class="product-desc">Hand thrown.</p>
                <span class="product-price">£18.00</span>
            </div>
            <div class="product-card"><h3>Bundle</h3><span>£5</span><span>£9</span></div>
            <div class="product-card"><h3>No price</h3></div>
        </body></html>"#;
        let view = PageView::from_parts("https://shop.example/", html);
        let products = product_cards(&view);

        assert_eq!(products.len(), 1);
        let mug = &products[0];
        assert_eq!(mug.title, "Stoneware Mug");
        assert_eq!(mug.price.as_deref(), Some("18.00"));
        assert_eq!(mug.currency, "GBP");
        assert_eq!(mug.description.as_deref(), Some("Hand thrown."));
        assert_eq!(mug.image_url.as_deref(), Some("https://shop.example/img/mug.jpg"));
    }

    #[test]
    fn test_menu_cards_take_preceding_section() {
        let html = r#"<html><body>
            <div class="menu-item"><h4 class="menu-item-name">Bread</h4><span>£4</span></div>
            <h2>Starters</h2>
            <div class="menu-item">
                <h4 class="menu-item-name">Tomato soup (V)</h4>
                <p class="menu-item-desc">With sourdough. £6.50</p>
            </div>
            <h2>Mains</h2>
            <div class="dish"><strong>Fish pie</strong><span>£14</span></div>
            <div class="dish"><strong>Fish pie</strong><span>£14</span></div>
        </body></html>"#;
        let view = PageView::from_parts("https://anchor.example/menu", html);
        let items = menu_cards(&view);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].name, "Bread");
        assert_eq!(items[0].section, "Menu");
        assert_eq!(items[1].name, "Tomato soup (V)");
        assert_eq!(items[1].section, "Starters");
        assert_eq!(items[1].price.as_deref(), Some("6.50"));
        assert_eq!(items[1].description.as_deref(), Some("With sourdough."));
        assert_eq!(items[1].dietary_tags, vec!["VegetarianDiet"]);
        assert_eq!(items[2].section, "Mains");
    }

    #[test]
    fn test_dietary_tags() {
        assert_eq!(
            dietary_tags("Curry (VG) (GF)"),
            vec!["VeganDiet", "GlutenFreeDiet"]
        );
        assert!(dietary_tags("Steak").is_empty());
    }
}
