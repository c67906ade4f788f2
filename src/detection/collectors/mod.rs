//! Independent evidence collectors run against one rendered page.
//!
//! Collectors never fail: anything they cannot parse simply produces no
//! signal.

pub mod dom;
pub mod platform;
pub mod structured;
pub mod url_pattern;

use tracing::debug;

use super::signals::DetectionSignals;
use crate::dom::PageView;

/// Run all four collectors against a parsed page.
pub fn collect_signals(page: &PageView<'_>) -> DetectionSignals {
    let signals = DetectionSignals {
        structured_data: structured::collect(page),
        platforms: platform::collect(page),
        url_patterns: url_pattern::collect(page),
        dom_heuristics: dom::collect(page),
    };

    debug!(
        url = page.url,
        structured = signals.structured_data.len(),
        platforms = signals.platforms.len(),
        url_patterns = signals.url_patterns.len(),
        dom = signals.dom_heuristics.len(),
        "Signals collected"
    );

    signals
}
