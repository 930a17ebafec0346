//! Headless Chromium session using chromiumoxide.

use std::path::Path;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use super::PageRenderer;
use crate::error::{Result, ScrapeError};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long a closing browser gets to exit before it is killed.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// One browser process and one tab, reused for every page of a run.
///
/// The browser is closed when the session is dropped, whichever way the run
/// ends.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    // declared last so it outlives the browser while fields drop
    runtime: Runtime,
}

impl ChromiumSession {
    pub fn launch(chrome_path: Option<&Path>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScrapeError::BrowserLaunch)?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(format!("failed to open tab: {}", e)))?;

            Ok::<_, ScrapeError>((browser, page, handler))
        })?;

        info!("Launched headless Chromium");
        Ok(ChromiumSession {
            browser,
            page,
            handler,
            runtime,
        })
    }
}

impl PageRenderer for ChromiumSession {
    fn render(&mut self, url: &str, ready_selector: &str, timeout: Duration) -> Result<String> {
        let page = &self.page;
        self.runtime.block_on(async {
            match tokio::time::timeout(timeout, page.goto(url)).await {
                Ok(Ok(_)) => debug!("Opened {}", url),
                Ok(Err(e)) => {
                    return Err(ScrapeError::Navigation {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
                Err(_) => {
                    return Err(ScrapeError::PageLoadTimeout {
                        url: url.to_string(),
                        timeout,
                    })
                }
            }

            if tokio::time::timeout(timeout, wait_for_selector(page, ready_selector))
                .await
                .is_err()
            {
                return Err(ScrapeError::PageLoadTimeout {
                    url: url.to_string(),
                    timeout,
                });
            }

            page.content().await.map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: format!("failed to read page content: {}", e),
            })
        })
    }
}

async fn wait_for_selector(page: &Page, selector: &str) {
    loop {
        match page.find_elements(selector).await {
            Ok(elements) if !elements.is_empty() => return,
            Ok(_) => {}
            Err(e) => debug!("`{}` not present yet: {}", selector, e),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        let browser = &mut self.browser;
        self.runtime.block_on(async {
            let exited = tokio::time::timeout(CLOSE_GRACE, async {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close Chromium cleanly: {}", e);
                }
                browser.wait().await
            })
            .await;

            match exited {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Failed to wait for Chromium to exit: {}", e),
                Err(_) => {
                    warn!("Chromium still running after {:?}, killing it", CLOSE_GRACE);
                    if let Some(Err(e)) = browser.kill().await {
                        warn!("Failed to kill Chromium: {}", e);
                    }
                }
            }
        });
        self.handler.abort();
        debug!("Chromium session closed");
    }
}
