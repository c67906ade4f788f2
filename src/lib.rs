//! Shopfront - business website classification and structured extraction.
//!
//! Given a site URL, decides whether it is a product catalogue, a food menu,
//! both or neither, then extracts products or menu items and scores how
//! complete the extraction is.

pub mod cli;
pub mod config;
pub mod detection;
pub mod dom;
pub mod engine;
pub mod extraction;
pub mod jsonld;
pub mod quality;
pub mod scrapers;

pub use config::{CrawlConfig, EngineConfig};
pub use detection::{DetectionScores, ExtractionPlan, PrimaryType, Priority};
pub use engine::{
    derive_extraction_plan, validate_extraction_quality, Engine, EngineError, SiteReport,
};
pub use extraction::{Availability, ExtractedMenuItem, ExtractedProduct, MultiPageMenuItem};
pub use quality::QualityAssessment;
