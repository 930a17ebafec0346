use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use weather_history_scraper::{run, ConfigOverrides, ScrapeConfig};

/// Scrape daily weather history for one station into a CSV file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

impl Cli {
    fn into_config(self) -> Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ScrapeConfig::default(),
        };
        config.apply_overrides(self.overrides);
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config()?;
    info!(
        "Scraping {} from {} into {}",
        config.station,
        config.start_date,
        config.output.display()
    );

    let summary = run(&config).context("Scrape failed")?;

    if !summary.skipped_dates.is_empty() {
        info!("Skipped {} date(s): {:?}", summary.skipped_dates.len(), summary.skipped_dates);
    }
    info!("Run summary: {}", serde_json::to_string(&summary)?);
    info!("Program complete");
    Ok(())
}
