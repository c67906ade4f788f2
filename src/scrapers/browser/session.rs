//! Session traits the engine drives pages through.

use async_trait::async_trait;

use super::types::{RenderedPage, RenderError};
use crate::engine::EngineError;

/// One browser session with a single active page context.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to `url`, wait for it to settle and snapshot the DOM.
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError>;

    /// Release the session. Must be safe to call more than once.
    async fn close(&mut self);
}

/// Opens isolated sessions. Launch failures are fatal to the run.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: PageSession;

    async fn launch(&self) -> Result<Self::Session, EngineError>;
}
