use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::{info, warn};
use scraper::{Html, Selector};
use weather_history_scraper::{extract_table, open_renderer, PageRenderer, RendererKind, ScrapeConfig};

/// Render one day's history page and save it as a regression fixture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Date of the page to capture (YYYY-MM-DD)
    date: NaiveDate,

    /// Fixture name, saved as src/tests/fixtures/failures/<name>.html
    name: String,

    #[arg(long, default_value = "WSSS")]
    station: String,

    #[arg(long, value_enum, default_value_t = RendererKind::Chromium)]
    renderer: RendererKind,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = ScrapeConfig {
        station: cli.station,
        renderer: cli.renderer,
        ..ScrapeConfig::default()
    };
    let url = config.lookup()?.for_date(cli.date);
    info!("Fetching HTML from {}...", url);

    let html = {
        let mut renderer = open_renderer(&config).context("Failed to open renderer")?;
        renderer
            .render(&url, &config.ready_selector, config.timeout())
            .context("Failed to render page")?
    };

    let failures_dir = Path::new("src/tests/fixtures/failures");
    fs::create_dir_all(failures_dir).context("Failed to create failures directory")?;
    let file_path = failures_dir.join(format!("{}.html", cli.name));
    fs::write(&file_path, &html).context("Failed to write HTML file")?;
    info!("Saved HTML to {} for regression testing", file_path.display());

    let document = Html::parse_document(&html);
    let table_selector = Selector::parse("table").unwrap();
    let th_selector = Selector::parse("th").unwrap();
    for (i, table) in document.select(&table_selector).enumerate() {
        let header: Vec<String> = table
            .select(&th_selector)
            .map(|th| th.text().collect::<String>().trim().to_string())
            .collect();
        println!("  table {}: {:?}", i, header);
    }

    match extract_table(&html, &config.table_selection()) {
        Ok(table) => println!(
            "Extraction succeeded: {} column(s), {} row(s). This may not be a failure case.",
            table.header.len(),
            table.rows.len()
        ),
        Err(e) => warn!("Extraction failed: {}", e),
    }

    Ok(())
}
