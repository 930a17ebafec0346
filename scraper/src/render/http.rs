use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{Html, Selector};

use super::PageRenderer;
use crate::error::{Result, ScrapeError};

/// Fetches pages without running their scripts.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("weather-history-scraper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpRenderer { client })
    }
}

impl PageRenderer for HttpRenderer {
    fn render(&mut self, url: &str, ready_selector: &str, timeout: Duration) -> Result<String> {
        let response = self.client.get(url).timeout(timeout).send().map_err(|e| {
            if e.is_timeout() {
                ScrapeError::PageLoadTimeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                ScrapeError::Http(e)
            }
        })?;
        let html = response.error_for_status()?.text()?;

        ensure_ready(&html, url, ready_selector)?;
        Ok(html)
    }
}

/// Without a script engine the selector either matches the served markup or
/// never will.
fn ensure_ready(html: &str, url: &str, ready_selector: &str) -> Result<()> {
    let selector = Selector::parse(ready_selector)
        .map_err(|_| ScrapeError::Config(format!("invalid selector `{}`", ready_selector)))?;

    if Html::parse_document(html).select(&selector).next().is_none() {
        return Err(ScrapeError::PageNotReady {
            url: url.to_string(),
            selector: ready_selector.to_string(),
        });
    }
    Ok(())
}
