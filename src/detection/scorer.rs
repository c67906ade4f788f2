//! Signal fusion: weighted evidence into catalogue/menu scores and a classification.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::signals::{Axis, DetectionSignals, DomHeuristicKind, PlatformCategory, Signal};

/// Both normalized scores must exceed this for a hybrid page.
pub const HYBRID_THRESHOLD: f64 = 0.6;

/// A normalized score must exceed this to classify at all.
pub const TYPE_THRESHOLD: f64 = 0.3;

/// Raw-score ratio one axis needs over the other to win outright.
pub const MARGIN: f64 = 1.3;

/// Normalized scores stay strictly below this.
pub const SCORE_CEILING: f64 = 0.99;

const NORMALIZATION_CONSTANT: f64 = 2.0;

/// Flat contribution of a dense price grid to both axes.
const PRICE_GRID_BOOST: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryType {
    Catalogue,
    Menu,
    Hybrid,
    None,
}

/// Fused detection result for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionScores {
    pub score_catalogue: f64,
    pub score_menu: f64,
    /// Always `max(score_catalogue, score_menu)`.
    pub confidence: f64,
    pub primary_type: PrimaryType,
    pub raw_catalogue: f64,
    pub raw_menu: f64,
    pub signals: DetectionSignals,
}

/// Map an unbounded raw score into `[0, 0.99)`. Monotonic.
pub fn normalize(raw: f64) -> f64 {
    if raw <= 0.0 || raw.is_nan() {
        return 0.0;
    }
    (raw / (raw + NORMALIZATION_CONSTANT)).min(SCORE_CEILING - f64::EPSILON)
}

/// Weighted contributions of one signal to (catalogue, menu).
fn contribution(signal: Signal<'_>) -> (f64, f64) {
    let on_axis = |axis: Axis, value: f64| match axis {
        Axis::Catalogue => (value, 0.0),
        Axis::Menu => (0.0, value),
    };

    match signal {
        Signal::StructuredData(s) => {
            let boost = if s.count > 5 { 1.5 } else { 1.0 };
            match s.schema_type.axis() {
                Some(axis) => on_axis(axis, s.confidence * boost),
                None => (0.0, 0.0),
            }
        }
        Signal::PlatformFingerprint(s) => match s.category {
            PlatformCategory::Ecommerce => (s.confidence * 1.2, 0.0),
            PlatformCategory::FoodOrdering => (0.0, s.confidence * 1.2),
            PlatformCategory::Delivery => (0.0, s.confidence * 0.5),
        },
        Signal::UrlPattern(s) => on_axis(s.kind, s.confidence * 0.8),
        Signal::DomHeuristic(s) => match s.kind {
            DomHeuristicKind::ProductCard => (s.confidence * 0.7, 0.0),
            DomHeuristicKind::MenuItem => (0.0, s.confidence * 0.7),
            DomHeuristicKind::PriceGrid => (PRICE_GRID_BOOST, PRICE_GRID_BOOST),
        },
    }
}

/// Classify from raw and normalized scores, rules evaluated in order.
pub fn classify(raw_catalogue: f64, raw_menu: f64) -> PrimaryType {
    let catalogue = normalize(raw_catalogue);
    let menu = normalize(raw_menu);

    if catalogue > HYBRID_THRESHOLD && menu > HYBRID_THRESHOLD {
        PrimaryType::Hybrid
    } else if catalogue > TYPE_THRESHOLD && raw_catalogue >= raw_menu * MARGIN {
        PrimaryType::Catalogue
    } else if menu > TYPE_THRESHOLD && raw_menu >= raw_catalogue * MARGIN {
        PrimaryType::Menu
    } else if catalogue > TYPE_THRESHOLD || menu > TYPE_THRESHOLD {
        // Ties go to catalogue
        if raw_menu > raw_catalogue {
            PrimaryType::Menu
        } else {
            PrimaryType::Catalogue
        }
    } else {
        PrimaryType::None
    }
}

/// Fuse a page's signals into scores.
pub fn score(signals: DetectionSignals) -> DetectionScores {
    let (raw_catalogue, raw_menu) = signals
        .iter()
        .map(contribution)
        .fold((0.0, 0.0), |(c, m), (dc, dm)| (c + dc, m + dm));

    let score_catalogue = normalize(raw_catalogue);
    let score_menu = normalize(raw_menu);
    let primary_type = classify(raw_catalogue, raw_menu);

    debug!(
        raw_catalogue,
        raw_menu,
        score_catalogue,
        score_menu,
        ?primary_type,
        "Signals fused"
    );

    DetectionScores {
        score_catalogue,
        score_menu,
        confidence: score_catalogue.max(score_menu),
        primary_type,
        raw_catalogue,
        raw_menu,
        signals,
    }
}
