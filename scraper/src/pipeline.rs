use chrono::NaiveDate;
use log::{debug, error, info};
use serde::Serialize;

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::extract::{extract_table, ObservationRow};
use crate::render::{open_renderer, PageRenderer};
use crate::writer::ObservationWriter;

/// Every row of a run plus the header all pages agreed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub header: Vec<String>,
    pub rows: Vec<ObservationRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub dates_visited: usize,
    pub rows_written: usize,
    pub skipped_dates: Vec<NaiveDate>,
    pub header: Option<Vec<String>>,
}

/// Remembers the first page's header and rejects any later page whose header
/// differs.
#[derive(Debug, Default)]
struct HeaderGuard {
    header: Option<Vec<String>>,
}

impl HeaderGuard {
    fn check(&mut self, date: NaiveDate, found: Vec<String>) -> Result<&[String]> {
        if let Some(expected) = &self.header {
            if *expected != found {
                return Err(ScrapeError::HeaderMismatch {
                    date,
                    expected: expected.clone(),
                    found,
                });
            }
        } else {
            self.header = Some(found);
        }
        Ok(self.header.as_deref().unwrap_or_default())
    }
}

/// Walks the configured date range, loading and parsing one page per date.
///
/// `on_day` receives the agreed header and that date's rows; an error from it
/// stops the run.
pub fn for_each_day<R, F>(config: &ScrapeConfig, renderer: &mut R, mut on_day: F) -> Result<RunSummary>
where
    R: PageRenderer + ?Sized,
    F: FnMut(&[String], Vec<ObservationRow>) -> Result<()>,
{
    let dates = config.date_range()?;
    let lookup = config.lookup()?;
    let retry = config.retry_policy();
    let selection = config.table_selection();
    let timeout = config.timeout();

    let mut guard = HeaderGuard::default();
    let mut summary = RunSummary::default();

    for date in &dates {
        info!("Gathering data from: {}", date);
        let url = lookup.for_date(date);
        summary.dates_visited += 1;

        let fetched = retry.run(date, |attempt| {
            debug!("Loading {} (attempt {})", url, attempt);
            renderer.render(&url, &config.ready_selector, timeout)
        });
        let html = match fetched {
            Ok(html) => html,
            Err(e) if config.skip_failed_days && e.is_page_failure() => {
                error!("Skipping {}: {}", date, e);
                summary.skipped_dates.push(date);
                continue;
            }
            Err(e) => return Err(e),
        };

        let table = extract_table(&html, &selection)?;
        let header = guard.check(date, table.header.clone())?;
        let rows = table.into_rows(date);
        debug!("{}: {} row(s)", date, rows.len());

        summary.rows_written += rows.len();
        on_day(header, rows)?;
    }

    summary.header = guard.header;
    Ok(summary)
}

/// Scrapes the range into memory.
pub fn collect_daily_history<R>(config: &ScrapeConfig, renderer: &mut R) -> Result<ResultSet>
where
    R: PageRenderer + ?Sized,
{
    let mut rows = Vec::new();
    let summary = for_each_day(config, renderer, |_, day_rows| {
        rows.extend(day_rows);
        Ok(())
    })?;

    Ok(ResultSet {
        header: summary.header.unwrap_or_default(),
        rows,
    })
}

/// Scrapes the range into the configured CSV file, flushing after each date.
pub fn scrape_to_csv<R>(config: &ScrapeConfig, renderer: &mut R) -> Result<RunSummary>
where
    R: PageRenderer + ?Sized,
{
    let mut writer = ObservationWriter::create(&config.output)?;
    let summary = for_each_day(config, renderer, |header, rows| {
        writer.write_header(header)?;
        writer.write_rows(&rows)
    })?;
    writer.finish()?;

    info!(
        "Wrote {} row(s) for {} date(s) to {}",
        summary.rows_written,
        summary.dates_visited,
        config.output.display()
    );
    Ok(summary)
}

/// Full run: validates the config, opens the renderer for the duration of the
/// scrape and writes the CSV. The renderer is released on every return path.
pub fn run(config: &ScrapeConfig) -> Result<RunSummary> {
    config.validate()?;
    let mut renderer = open_renderer(config)?;
    scrape_to_csv(config, &mut renderer)
}
