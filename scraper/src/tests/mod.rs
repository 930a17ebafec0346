use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::error::ScrapeError;
use crate::render::PageRenderer;

pub mod fixtures;

/// Helper function to save HTML that failed to extract, for future regression testing
pub fn save_failed_html(html: &str, test_name: &str) -> Result<()> {
    let failures_dir = Path::new("src/tests/fixtures/failures");
    fs::create_dir_all(failures_dir)?;

    let file_path = failures_dir.join(format!("{}.html", test_name));
    fs::write(&file_path, html)?;

    println!("Saved failed HTML to {}", file_path.display());
    Ok(())
}

/// Serves canned pages by URL. Unknown URLs time out, and URLs registered
/// with `fail_first` time out that many times before succeeding.
#[derive(Default)]
pub struct CannedPages {
    pages: HashMap<String, String>,
    pending_failures: HashMap<String, u32>,
    pub requests: Vec<String>,
}

impl CannedPages {
    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    pub fn fail_first(mut self, url: &str, times: u32) -> Self {
        self.pending_failures.insert(url.to_string(), times);
        self
    }
}

impl PageRenderer for CannedPages {
    fn render(&mut self, url: &str, _ready_selector: &str, timeout: Duration) -> crate::Result<String> {
        self.requests.push(url.to_string());

        if let Some(remaining) = self.pending_failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ScrapeError::PageLoadTimeout {
                    url: url.to_string(),
                    timeout,
                });
            }
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::PageLoadTimeout {
                url: url.to_string(),
                timeout,
            })
    }
}
