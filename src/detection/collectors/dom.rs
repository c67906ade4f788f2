//! DOM heuristic collector: price cards, cart buttons, menu headings, dietary marks.

use scraper::ElementRef;
use tracing::debug;

use crate::detection::signals::{DomHeuristicKind, DomSignal};
use crate::dom::{element_text, is_heading, own_text, single_price, PageView, PRICE_RE};

/// Class-name fragments that mark a product card.
pub const PRODUCT_CLASS_HINTS: &[&str] = &["product", "item-card", "shop-item"];

pub const CART_PHRASES: &[&str] = &[
    "add to cart",
    "add to basket",
    "add to bag",
    "add to trolley",
    "buy now",
];

pub const MENU_SECTION_WORDS: &[&str] = &[
    "starters",
    "appetizers",
    "appetisers",
    "small plates",
    "mains",
    "main courses",
    "entrees",
    "entrées",
    "sides",
    "desserts",
    "puddings",
    "sharing",
    "salads",
    "soups",
    "burgers",
    "pizzas",
    "breakfast",
    "brunch",
    "lunch",
    "dinner",
    "kids menu",
    "specials",
    "drinks",
    "cocktails",
    "wines",
    "beers",
];

pub const DIETARY_MARKERS: &[&str] = &[
    "(v)",
    "(vg)",
    "(ve)",
    "(gf)",
    "(df)",
    "vegan",
    "vegetarian",
    "gluten free",
    "gluten-free",
    "dairy free",
    "dairy-free",
];

/// Elements whose text never reaches the reader.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A price grid needs more than this many prices on the page.
const PRICE_GRID_MIN: usize = 5;

pub fn item_confidence(count: usize) -> f64 {
    (0.4 + count as f64 * 0.05).min(0.85)
}

pub fn price_grid_confidence(count: usize) -> f64 {
    (0.3 + count as f64 * 0.02).min(0.7)
}

#[derive(Default)]
struct Tally {
    price_cards: usize,
    cart_buttons: usize,
    section_headings: usize,
    dietary_marks: usize,
}

fn is_price_card(element: ElementRef<'_>) -> bool {
    let class = element
        .value()
        .attr("class")
        .unwrap_or_default()
        .to_lowercase();
    PRODUCT_CLASS_HINTS.iter().any(|hint| class.contains(hint))
        && single_price(&element_text(element)).is_some()
}

impl Tally {
    /// A card is the outermost hinted element holding one distinct price.
    /// Its hinted children (`product-card__price`) are not cards of their own,
    /// and grid wrappers holding several prices are not cards at all.
    fn inspect(&mut self, element: ElementRef<'_>, in_card: bool) -> bool {
        let name = element.value().name();

        let card = !in_card && is_price_card(element);
        if card {
            self.price_cards += 1;
        }

        let mut own = own_text(element).to_lowercase();
        if matches!(name, "button" | "input") {
            if let Some(value) = element.value().attr("value") {
                own.push(' ');
                own.push_str(&value.to_lowercase());
            }
        }

        if CART_PHRASES.iter().any(|phrase| own.contains(phrase)) {
            self.cart_buttons += 1;
        }

        if is_heading(name) {
            let heading = element_text(element).to_lowercase();
            if MENU_SECTION_WORDS.iter().any(|word| heading.contains(word)) {
                self.section_headings += 1;
            }
        }

        if DIETARY_MARKERS.iter().any(|marker| own.contains(marker)) {
            self.dietary_marks += 1;
        }

        in_card || card
    }
}

fn item_signal(kind: DomHeuristicKind, indicator: &str, count: usize) -> Option<DomSignal> {
    (count > 0).then(|| DomSignal {
        kind,
        indicator: indicator.to_string(),
        count,
        confidence: item_confidence(count),
    })
}

pub fn collect(page: &PageView<'_>) -> Vec<DomSignal> {
    let mut tally = Tally::default();
    let mut stack = vec![(page.document.root_element(), false)];
    while let Some((element, in_card)) = stack.pop() {
        if INVISIBLE_TAGS.contains(&element.value().name()) {
            continue;
        }
        let in_card = tally.inspect(element, in_card);
        stack.extend(element.children().filter_map(ElementRef::wrap).map(|child| (child, in_card)));
    }

    let prices = PRICE_RE.find_iter(&page.body_text()).count();

    debug!(
        price_cards = tally.price_cards,
        cart_buttons = tally.cart_buttons,
        section_headings = tally.section_headings,
        dietary_marks = tally.dietary_marks,
        prices,
        "DOM heuristics tallied"
    );

    let mut signals: Vec<DomSignal> = [
        item_signal(DomHeuristicKind::ProductCard, "price_card", tally.price_cards),
        item_signal(DomHeuristicKind::ProductCard, "add_to_cart", tally.cart_buttons),
        item_signal(DomHeuristicKind::MenuItem, "section_heading", tally.section_headings),
        item_signal(DomHeuristicKind::MenuItem, "dietary_marker", tally.dietary_marks),
    ]
    .into_iter()
    .flatten()
    .collect();

    if prices > PRICE_GRID_MIN {
        signals.push(DomSignal {
            kind: DomHeuristicKind::PriceGrid,
            indicator: "currency_prices".to_string(),
            count: prices,
            confidence: price_grid_confidence(prices),
        });
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(signals: &'a [DomSignal], indicator: &str) -> Option<&'a DomSignal> {
        signals.iter().find(|s| s.indicator == indicator)
    }

    #[test]
    fn test_product_cards_and_cart_buttons() {
        let html = r#"<html><body>
            <div class="product-card"><h3>Mug</h3><span>£8.00</span><button>Add to cart</button></div>
            <div class="product-card"><h3>Cup</h3><span>£6.50</span><button>Add to Cart</button></div>
        </body></html>"#;
        let view = PageView::from_parts("https://shop.example/", html);
        let signals = collect(&view);

        let cards = find(&signals, "price_card").unwrap();
        assert_eq!(cards.kind, DomHeuristicKind::ProductCard);
        assert_eq!(cards.count, 2);
        assert_eq!(find(&signals, "add_to_cart").unwrap().count, 2);
        assert!(find(&signals, "currency_prices").is_none());
    }

    #[test]
    fn test_menu_headings_and_dietary_markers() {
        let html = r#"<html><body>
            <h2>Starters</h2><p>Tomato soup (V) £5</p>
            <h2>Mains</h2><p>Vegan curry £12</p><p>Fish pie £14</p>
            <h2>Desserts</h2><p>Sticky toffee pudding £6</p>
            <h2>Drinks</h2><p>Lemonade £3</p><p>Cola £3</p>
        </body></html>"#;
        let view = PageView::from_parts("https://anchor.example/menu", html);
        let signals = collect(&view);

        assert_eq!(find(&signals, "section_heading").unwrap().count, 4);
        assert_eq!(find(&signals, "dietary_marker").unwrap().count, 2);

        let grid = find(&signals, "currency_prices").unwrap();
        assert_eq!(grid.kind, DomHeuristicKind::PriceGrid);
        assert_eq!(grid.count, 6);
        assert!((grid.confidence - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_nested_card_classes_count_once_per_card() {
        let html = r#"<html><body><main class="product-grid">
            <div class="product-card">
                <h3 class="product-card__title">Mug</h3>
                <span class="product-card__price">£8.00</span>
            </div>
            <div class="product-card">
                <h3 class="product-card__title">Cup</h3>
                <span class="product-card__price">£6.50</span>
            </div>
        </main></body></html>"#;
        let view = PageView::from_parts("https://shop.example/", html);
        let signals = collect(&view);

        let cards = find(&signals, "price_card").unwrap();
        assert_eq!(cards.count, 2);
        assert_eq!(cards.confidence, item_confidence(2));
    }

    #[test]
    fn test_script_and_style_text_is_ignored() {
        let html = r#"<html><head>
            <style>.vegan-badge { color: green; }</style>
            </head><body>
            <script>window.strings={addToCart:"Add to cart",soldOut:"Vegan range sold out"}</script>
            <noscript><div class="product">Add to basket £4</div></noscript>
            <template><h2>Starters</h2></template>
            <p>About us</p>
        </body></html>"#;
        let view = PageView::from_parts("https://studio.example/", html);
        assert!(collect(&view).is_empty());
    }

    #[test]
    fn test_confidence_caps() {
        assert_eq!(item_confidence(100), 0.85);
        assert_eq!(price_grid_confidence(100), 0.7);
    }

    #[test]
    fn test_empty_page() {
        let view = PageView::from_parts("https://plain.example/", "<html><body></body></html>");
        assert!(collect(&view).is_empty());
    }
}
