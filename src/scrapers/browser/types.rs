//! Rendered page snapshot and render errors.

use thiserror::Error;

/// A page after rendering: the serialized live DOM plus where it ended up.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub final_url: String,
    pub html: String,
}

impl RenderedPage {
    pub fn new(final_url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            html: html.into(),
        }
    }
}

/// Errors from rendering a single page. Always recoverable by the caller.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    Unavailable,
}
