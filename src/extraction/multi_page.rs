//! Breadth-first menu crawl over a single session.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use super::menu::extract_menu_items;
use super::types::{ExtractedMenuItem, MultiPageMenuItem};
use crate::detection::collectors::url_pattern::is_menu_url;
use crate::dom::{normalize_url, PageView};
use crate::scrapers::{PageSession, RenderedPage};

/// Outcome of a crawl: deduplicated items plus how many visits were spent.
#[derive(Debug, Clone, Default)]
pub struct MenuCrawl {
    pub items: Vec<MultiPageMenuItem>,
    pub pages_visited: usize,
}

/// Crawl menu pages starting at `seed_url`, reading at most `link_sample`
/// links per page.
///
/// Every navigation attempt, failed or not, counts toward `max_pages`.
/// Only same-host links that look like menu pages are followed, and a URL
/// is never visited twice (fragments ignored, redirects included). Items
/// repeat-checked on (name, section, source page) keep their first visit.
pub async fn crawl_menu<S>(
    session: &mut S,
    seed_url: &str,
    max_pages: usize,
    link_sample: usize,
) -> MenuCrawl
where
    S: PageSession + ?Sized,
{
    let seed = normalize_url(seed_url);
    let mut queue = VecDeque::from([seed.clone()]);
    let mut queued: HashSet<String> = HashSet::from([seed]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen_items = HashSet::new();
    let mut crawl = MenuCrawl::default();

    while crawl.pages_visited < max_pages {
        let Some(url) = queue.pop_front() else {
            break;
        };
        if !visited.insert(url.clone()) {
            continue;
        }
        crawl.pages_visited += 1;
        let visit = crawl.pages_visited;

        let page = match session.render(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                continue;
            }
        };
        let final_url = normalize_url(&page.final_url);
        visited.insert(final_url.clone());

        let (items, links) = scan_page(&page, &final_url, link_sample);

        let before = crawl.items.len();
        for item in items {
            if seen_items.insert(item.dedup_key()) {
                crawl.items.push(MultiPageMenuItem { item, page_visit: visit });
            }
        }
        debug!(
            url = %final_url,
            visit,
            new_items = crawl.items.len() - before,
            "Menu page scanned"
        );

        for link in links {
            if !visited.contains(&link) && queued.insert(link.clone()) {
                queue.push_back(link);
            }
        }
    }

    info!(
        pages = crawl.pages_visited,
        items = crawl.items.len(),
        "Menu crawl finished for {}",
        seed_url
    );
    crawl
}

/// Parse a rendered page once: its menu items and the menu links worth following.
fn scan_page(
    page: &RenderedPage,
    final_url: &str,
    link_sample: usize,
) -> (Vec<ExtractedMenuItem>, Vec<String>) {
    let view = PageView::from_parts(final_url, &page.html);
    let items = extract_menu_items(&view);
    let links = view
        .internal_links(link_sample)
        .into_iter()
        .filter(|link| is_menu_url(link))
        .collect();
    (items, links)
}
