//! eksi-scraper - Ekşi Sözlük topic scraper
//!
//! Walks every page of a topic, extracts each entry's author, text, date and
//! favorite count, and writes the collected entries to a CSV file.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Pagination loop, page fetcher, request headers
//! - [`parser`] - HTML parsing and entry extraction
//! - [`models`] - Core data structures and types
//! - [`storage`] - CSV output
//! - [`error`] - Unified error type
//! - [`utils`] - Retry helper and small utilities
//!
//! # Example
//!
//! ```no_run
//! use eksi_scraper::config::Config;
//! use eksi_scraper::crawler::{TopicCrawler, TopicUrl};
//! use eksi_scraper::storage::CsvStorage;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::default();
//!     config.apply_env();
//!     config.validate()?;
//!     let topic = TopicUrl::parse("https://eksisozluk.com/rust--5432")?;
//!     let report = TopicCrawler::new(&config)?.crawl(&topic).await?;
//!     CsvStorage::new(&config.output.path).write_entries(&report.entries)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{PageFetcher, PolitenessDelay, TopicCrawler, TopicUrl};
    pub use crate::error::{Error, ErrorCategory, Result, ScraperErrorTrait};
    pub use crate::models::{CrawlReport, CrawlState, Entry, StopReason};
    pub use crate::parser::EntryParser;
    pub use crate::storage::CsvStorage;
}

// Direct re-exports for convenience
pub use models::{CrawlReport, Entry, StopReason};
