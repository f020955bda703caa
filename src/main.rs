use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use eksi_scraper::config::{Config, LoggingConfig};
use eksi_scraper::crawler::{TopicCrawler, TopicUrl};
use eksi_scraper::error::ScraperErrorTrait;
use eksi_scraper::storage::CsvStorage;

#[derive(Parser)]
#[command(
    name = "eksi-scraper",
    version,
    about = "Scrape every entry of an Ekşi Sözlük topic into a CSV file",
    long_about = None
)]
struct Cli {
    /// Topic URL, e.g. https://eksisozluk.com/rust--5432
    url: String,

    /// Output CSV path [default: entries.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many pages even if the topic has more
    #[arg(long)]
    max_pages: Option<u32>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    setup_tracing(&config.logging, cli.verbose)?;

    tracing::info!(url = %cli.url, output = %config.output.path.display(), "eksi-scraper starting");

    if let Err(err) = run(&cli.url, &config).await {
        tracing::error!(
            category = err.category().as_str(),
            error = %err,
            output = %config.output.path.display(),
            "Run failed"
        );
        return Err(err.into());
    }

    Ok(())
}

/// Crawl the topic and write the CSV
async fn run(url: &str, config: &Config) -> eksi_scraper::error::Result<()> {
    let topic = TopicUrl::parse(url)?;
    let report = TopicCrawler::new(config)?.crawl(&topic).await?;

    let storage = CsvStorage::new(&config.output.path).with_bom(config.output.utf8_bom);
    storage.write_entries(&report.entries)?;

    tracing::info!(
        entries = report.entries.len(),
        pages = report.pages_fetched,
        skipped = report.skipped_entries,
        reason = %report.stop_reason,
        elapsed_secs = report.elapsed_secs(),
        output = %storage.path().display(),
        "Saved entries"
    );

    Ok(())
}

/// Defaults, then the config file, then environment, then flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env();

    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("eksi_scraper=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!(
                "eksi_scraper={},warn",
                logging.level.to_ascii_lowercase()
            ))
        })
    };

    let console = match logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let file = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}
