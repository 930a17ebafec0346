pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod writer;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::config::{ConfigOverrides, RendererKind, ScrapeConfig};
pub use crate::dates::DateRange;
pub use crate::error::{Result, ScrapeError};
pub use crate::extract::{extract_table, ObservationRow, ObservationTable, TableSelection};
pub use crate::lookup::LookupUrl;
pub use crate::pipeline::{collect_daily_history, for_each_day, run, scrape_to_csv, ResultSet, RunSummary};
pub use crate::render::{open_renderer, ChromiumSession, HttpRenderer, PageRenderer};
pub use crate::retry::RetryPolicy;
pub use crate::writer::{write_results, ObservationWriter};
