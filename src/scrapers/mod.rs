//! Page rendering collaborators.

pub mod browser;

pub use browser::{
    BrowserEngineConfig, BrowserFetcher, BrowserLauncher, PageSession, RenderError,
    RenderedPage, SessionLauncher,
};
