//! Site classification: collectors, signal fusion and extraction planning.

pub mod collectors;
pub mod plan;
pub mod scorer;
pub mod signals;

pub use collectors::collect_signals;
pub use plan::{derive_extraction_plan, ExtractionPlan, Extractor, Priority};
pub use scorer::{score, DetectionScores, PrimaryType};
pub use signals::{
    Axis, DetectionSignals, DomHeuristicKind, DomSignal, PlatformCategory, PlatformSignal,
    SchemaType, Signal, StructuredDataSignal, UrlPatternSignal,
};

use crate::dom::PageView;

/// Collect and fuse the signals of one parsed page.
pub fn detect(page: &PageView<'_>) -> DetectionScores {
    score(collect_signals(page))
}
