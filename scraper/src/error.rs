use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("timed out after {timeout:?} waiting for page content at {url}")]
    PageLoadTimeout { url: String, timeout: Duration },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("page at {url} has no element matching `{selector}`")]
    PageNotReady { url: String, selector: String },

    #[error("table index {index} out of range: page has {found} table(s)")]
    TableIndexOutOfRange { index: usize, found: usize },

    #[error("{matches} tables match the expected columns, cannot pick one")]
    AmbiguousTable { matches: usize },

    #[error("header on {date} does not match earlier pages: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        date: NaiveDate,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("giving up on {date} after {attempts} attempt(s)")]
    RetriesExhausted {
        date: NaiveDate,
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Whether another attempt at the same page could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScrapeError::PageLoadTimeout { .. }
                | ScrapeError::Navigation { .. }
                | ScrapeError::PageNotReady { .. }
                | ScrapeError::Http(_)
        )
    }

    /// The page for one date could not be loaded, with or without retries.
    pub fn is_page_failure(&self) -> bool {
        self.is_transient() || matches!(self, ScrapeError::RetriesExhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
