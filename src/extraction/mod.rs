//! Structured item extraction: products, menu items and multi-page menu crawls.

pub mod catalogue;
pub mod dom;
pub mod menu;
pub mod multi_page;
pub mod types;

pub use catalogue::extract_products;
pub use menu::extract_menu_items;
pub use multi_page::{crawl_menu, MenuCrawl};
pub use types::{
    Availability, ExtractedMenuItem, ExtractedProduct, MultiPageMenuItem, DEFAULT_CURRENCY,
    DEFAULT_SECTION,
};
