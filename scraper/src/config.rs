use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::Deserialize;

use crate::dates::DateRange;
use crate::error::{Result, ScrapeError};
use crate::extract::TableSelection;
use crate::lookup::{LookupUrl, DEFAULT_URL_TEMPLATE};
use crate::retry::RetryPolicy;

/// How pages are loaded before extraction
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium, runs page scripts
    Chromium,
    /// Plain HTTP GET, for server-rendered pages
    Http,
}

impl Default for RendererKind {
    fn default() -> Self {
        RendererKind::Chromium
    }
}

/// Everything a scraping run needs. Missing JSON fields take the defaults.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScrapeConfig {
    pub station: String,
    pub url_template: String,
    pub start_date: NaiveDate,
    pub days: u32,
    /// Exclusive end date, takes precedence over `days` when set.
    pub end_date: Option<NaiveDate>,
    pub output: PathBuf,
    pub renderer: RendererKind,
    pub chrome_path: Option<PathBuf>,
    pub ready_selector: String,
    pub timeout_secs: u64,
    pub table_index: usize,
    pub expected_columns: Vec<String>,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub skip_failed_days: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            station: "WSSS".to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            days: 400,
            end_date: None,
            output: PathBuf::from("./WeatherData.csv"),
            renderer: RendererKind::default(),
            chrome_path: None,
            ready_selector: "table".to_string(),
            timeout_secs: 20,
            table_index: 1,
            expected_columns: Vec::new(),
            max_attempts: 1,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 30_000,
            skip_failed_days: false,
        }
    }
}

impl ScrapeConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: ScrapeConfig = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ScrapeError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Checks the settings that would otherwise fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        self.date_range()?;
        self.lookup()?;
        scraper::Selector::parse(&self.ready_selector).map_err(|_| {
            ScrapeError::Config(format!("invalid ready selector `{}`", self.ready_selector))
        })?;
        if self.timeout_secs == 0 {
            return Err(ScrapeError::Config("timeout must be at least one second".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(ScrapeError::Config("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Applies command-line values on top of this config. Only the values
    /// that were given replace what the file or the defaults set.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(station) = overrides.station {
            self.station = station;
        }
        if let Some(start) = overrides.start {
            self.start_date = start;
        }
        if let Some(days) = overrides.days {
            self.days = days;
        }
        if overrides.end.is_some() {
            self.end_date = overrides.end;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(renderer) = overrides.renderer {
            self.renderer = renderer;
        }
        if overrides.chrome.is_some() {
            self.chrome_path = overrides.chrome;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(retries) = overrides.retries {
            self.max_attempts = retries.saturating_add(1);
        }
        if let Some(index) = overrides.table_index {
            self.table_index = index;
        }
        if !overrides.expect_columns.is_empty() {
            self.expected_columns = overrides.expect_columns;
        }
        if overrides.skip_failed_days {
            self.skip_failed_days = true;
        }
    }

    pub fn date_range(&self) -> Result<DateRange> {
        match self.end_date {
            Some(end) => DateRange::new(self.start_date, end),
            None => DateRange::from_day_count(self.start_date, self.days),
        }
    }

    pub fn lookup(&self) -> Result<LookupUrl> {
        LookupUrl::new(&self.url_template, &self.station)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    pub fn table_selection(&self) -> TableSelection {
        TableSelection {
            index: self.table_index,
            expected_columns: self.expected_columns.clone(),
        }
    }
}

/// Command-line values layered over the config file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Station code, e.g. WSSS
    #[arg(long)]
    pub station: Option<String>,

    /// First date to scrape (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Number of days to scrape
    #[arg(long)]
    pub days: Option<u32>,

    /// Exclusive end date (YYYY-MM-DD), overrides --days
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Output CSV path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// How pages are loaded
    #[arg(long, value_enum)]
    pub renderer: Option<RendererKind>,

    /// Chromium executable, auto-detected when omitted
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Seconds to wait for the table to appear
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Extra attempts per date after a failed page load (0 disables retry)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Position of the observations table when no column matches
    #[arg(long)]
    pub table_index: Option<usize>,

    /// Column the observations table must have (repeatable)
    #[arg(long = "expect-column")]
    pub expect_columns: Vec<String>,

    /// Log and skip dates that keep failing instead of stopping
    #[arg(long)]
    pub skip_failed_days: bool,
}
