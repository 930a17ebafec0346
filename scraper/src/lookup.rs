use chrono::{Datelike, NaiveDate};

use crate::error::{Result, ScrapeError};

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://www.wunderground.com/history/daily/{station}/date/{year}-{month}-{day}.html";

const DATE_PLACEHOLDERS: [&str; 3] = ["{year}", "{month}", "{day}"];

/// Builds the daily history URL for one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupUrl {
    template: String,
    station: String,
}

impl LookupUrl {
    pub fn new(template: &str, station: &str) -> Result<Self> {
        if let Some(missing) = DATE_PLACEHOLDERS.iter().find(|p| !template.contains(*p)) {
            return Err(ScrapeError::Config(format!(
                "URL template `{}` is missing {}",
                template, missing
            )));
        }
        if station.trim().is_empty() {
            return Err(ScrapeError::Config("station code is empty".to_string()));
        }

        Ok(LookupUrl {
            template: template.to_string(),
            station: station.trim().to_string(),
        })
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    /// Year, month and day are substituted as unpadded decimals.
    pub fn for_date(&self, date: NaiveDate) -> String {
        self.template
            .replace("{station}", &self.station)
            .replace("{year}", &date.year().to_string())
            .replace("{month}", &date.month().to_string())
            .replace("{day}", &date.day().to_string())
    }
}
