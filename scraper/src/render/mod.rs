//! Page loading behind a small blocking trait.
//!
//! The pipeline only needs "give me the markup of this URL once the table is
//! there"; how that happens (headless Chromium or a plain GET) is picked from
//! the config.

pub mod chromium;
pub mod http;

use std::time::Duration;

use crate::config::{RendererKind, ScrapeConfig};
use crate::error::Result;

pub use chromium::ChromiumSession;
pub use http::HttpRenderer;

pub trait PageRenderer {
    /// Loads `url` and returns the rendered markup once an element matching
    /// `ready_selector` is present. Fails with a transient error when the
    /// element has not appeared within `timeout`.
    fn render(&mut self, url: &str, ready_selector: &str, timeout: Duration) -> Result<String>;
}

impl<R: PageRenderer + ?Sized> PageRenderer for Box<R> {
    fn render(&mut self, url: &str, ready_selector: &str, timeout: Duration) -> Result<String> {
        (**self).render(url, ready_selector, timeout)
    }
}

/// Opens the renderer named by the config. The returned session owns any
/// browser process and releases it when dropped.
pub fn open_renderer(config: &ScrapeConfig) -> Result<Box<dyn PageRenderer>> {
    match config.renderer {
        RendererKind::Chromium => Ok(Box::new(ChromiumSession::launch(
            config.chrome_path.as_deref(),
        )?)),
        RendererKind::Http => Ok(Box::new(HttpRenderer::new()?)),
    }
}
