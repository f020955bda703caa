//! Topic crawling with pagination and politeness delays
//!
//! This module implements the fetch → parse → accumulate loop that walks a
//! topic page by page. Pages are requested strictly one at a time.

pub mod fetcher;
pub mod headers;
pub mod url;

use chrono::Utc;
use rand::Rng;
use std::time::Duration;

use crate::config::Config;
use crate::models::{CrawlReport, CrawlState, Entry, StopReason};
use crate::parser::EntryParser;
use crate::utils::error::CrawlerError;

pub use fetcher::PageFetcher;
pub use url::TopicUrl;

/// Randomized pause between page requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessDelay {
    min: Duration,
    max: Duration,
}

impl PolitenessDelay {
    /// Uniform delay in `[min, max]`; the bounds are swapped if inverted
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draw the next delay
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let ms = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(ms as u64)
    }

    /// Sleep for a freshly drawn delay
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Politeness delay");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Sequential crawler for one topic
pub struct TopicCrawler {
    fetcher: PageFetcher,
    parser: EntryParser,
    delay: PolitenessDelay,
    initial_delay: PolitenessDelay,
    max_pages: u32,
}

impl TopicCrawler {
    /// Create a crawler from configuration
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::Fetch` if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self, CrawlerError> {
        let fetcher = PageFetcher::from_config(config)?;
        let (min, max) = config.page_delay();
        let (initial_min, initial_max) = config.initial_delay();
        Ok(
            Self::with_parts(fetcher, PolitenessDelay::new(min, max), config.crawler.max_pages)
                .with_initial_delay(PolitenessDelay::new(initial_min, initial_max)),
        )
    }

    /// Assemble a crawler from explicit parts
    ///
    /// A `max_pages` of 0 is treated as 1. No pause is taken before the
    /// first page unless [`TopicCrawler::with_initial_delay`] sets one.
    #[must_use]
    pub fn with_parts(fetcher: PageFetcher, delay: PolitenessDelay, max_pages: u32) -> Self {
        Self {
            fetcher,
            parser: EntryParser::new(),
            delay,
            initial_delay: PolitenessDelay::none(),
            max_pages: max_pages.max(1),
        }
    }

    /// Pause before the first page request
    #[must_use]
    pub fn with_initial_delay(mut self, delay: PolitenessDelay) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Crawl every page of a topic
    ///
    /// Starts at page 1 and keeps going until the page's last page indicator
    /// is reached, the indicator is missing, the entry list disappears,
    /// `max_pages` is hit, or a later page fails after all retries. Entries
    /// come back in page order, then on-page order.
    ///
    /// # Errors
    ///
    /// `CrawlerError::FirstPageUnreachable` when page 1 cannot be fetched.
    /// Failures on later pages end the crawl early with partial results.
    pub async fn crawl(&self, topic: &TopicUrl) -> Result<CrawlReport, CrawlerError> {
        let started_at = Utc::now();
        let mut entries: Vec<Entry> = Vec::new();
        let mut skipped_entries = 0;
        let mut pages_fetched = 0;
        let mut last_page = None;
        let mut state = CrawlState::start();

        tracing::info!(topic = %topic, max_pages = self.max_pages, "Starting topic crawl");

        while let CrawlState::Fetching { page } = state {
            if page == 1 {
                self.initial_delay.wait().await;
            } else {
                self.delay.wait().await;
            }

            let url = topic.page_url(page);
            let html = match self.fetcher.fetch_page(&url, topic.as_str()).await {
                Ok(html) => html,
                Err(source) if page == 1 => {
                    tracing::error!(url = %url, error = %source, "First page unreachable");
                    return Err(CrawlerError::FirstPageUnreachable { url, source });
                }
                Err(e) => {
                    tracing::warn!(
                        page,
                        error = %e,
                        kept = entries.len(),
                        "Page failed, stopping with partial results"
                    );
                    state = CrawlState::Done(StopReason::FetchFailed { page });
                    break;
                }
            };

            let parsed = self.parser.parse_page(&html);
            pages_fetched += 1;

            if !parsed.has_entry_list {
                tracing::warn!(page, url = %url, "Entry list not found, ending pagination");
                state = CrawlState::Done(StopReason::MissingEntryList);
                break;
            }

            tracing::info!(
                page,
                of = ?parsed.page_count,
                found = parsed.entries.len(),
                skipped = parsed.skipped.len(),
                "Scraped page"
            );

            skipped_entries += parsed.skipped.len();
            entries.extend(parsed.entries);
            last_page = parsed.page_count;

            state = self.next_state(page, parsed.page_count);
        }

        let stop_reason = match state {
            CrawlState::Done(reason) => reason,
            // the loop only exits on Done
            CrawlState::Fetching { .. } => StopReason::NoPageIndicator,
        };

        tracing::info!(
            total = entries.len(),
            pages = pages_fetched,
            skipped = skipped_entries,
            reason = %stop_reason,
            "Topic crawl finished"
        );

        Ok(CrawlReport {
            entries,
            pages_fetched,
            skipped_entries,
            last_page,
            stop_reason,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Decide where to go after `page`
    fn next_state(&self, page: u32, page_count: Option<u32>) -> CrawlState {
        match page_count {
            None => {
                tracing::warn!(page, "No page indicator, ending pagination");
                CrawlState::Done(StopReason::NoPageIndicator)
            }
            Some(last) if page >= last => CrawlState::Done(StopReason::LastPage),
            Some(_) if page >= self.max_pages => {
                tracing::warn!(page, max_pages = self.max_pages, "Reached max pages limit");
                CrawlState::Done(StopReason::MaxPagesReached)
            }
            Some(_) => CrawlState::Fetching { page: page + 1 },
        }
    }
}
