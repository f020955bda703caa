// Core data structures for the topic scraper

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One user-submitted entry under a topic
///
/// Field names follow the CSV header: `username,entry,date,favorites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "username")]
    pub author: String,
    #[serde(rename = "entry")]
    pub text: String,
    /// Site-native date string, e.g. "01.02.2020 14:35 ~ 15:00"
    pub date: String,
    #[serde(rename = "favorites")]
    pub favorite_count: u32,
}

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Current page reached the last page indicator
    LastPage,
    /// Page carried no last page indicator
    NoPageIndicator,
    /// Hit the configured `max_pages` safety bound
    MaxPagesReached,
    /// Entry list could not be located on the page
    MissingEntryList,
    /// A page after the first failed after all retries
    FetchFailed { page: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastPage => write!(f, "reached last page"),
            Self::NoPageIndicator => write!(f, "no page indicator"),
            Self::MaxPagesReached => write!(f, "max pages reached"),
            Self::MissingEntryList => write!(f, "entry list not found"),
            Self::FetchFailed { page } => write!(f, "page {page} failed"),
        }
    }
}

/// Pagination state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// More pages to fetch, starting with `page`
    Fetching { page: u32 },
    /// Terminal
    Done(StopReason),
}

impl CrawlState {
    pub fn start() -> Self {
        Self::Fetching { page: 1 }
    }
}

/// Result of crawling one topic
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Entries in page order, then on-page order
    pub entries: Vec<Entry>,
    pub pages_fetched: u32,
    /// Malformed entries dropped during extraction
    pub skipped_entries: usize,
    /// Last page indicator from the most recent page, if any
    pub last_page: Option<u32>,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock duration of the crawl in seconds
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0
    }
}
