//! HTML parsing and entry extraction
//!
//! A topic page is parsed into a document tree once; each field of each
//! entry is then pulled out with a fixed selector. A field whose selector
//! yields nothing fails on its own, and the entry holding it is skipped
//! without disturbing its siblings.

pub mod sanitize;
pub mod selectors;

use scraper::{ElementRef, Html};

use crate::models::Entry;
use crate::utils::error::ParseError;
use crate::utils::normalize_whitespace;
use self::selectors::{
    AUTHOR_ATTR, ENTRY_AUTHOR, ENTRY_CONTENT, ENTRY_DATE, ENTRY_ITEM, ENTRY_LIST,
    FAVORITE_COUNT_ATTR, PAGER, PAGER_LINK, PAGE_COUNT_ATTR,
};

/// Everything extracted from one topic page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Valid entries in on-page order
    pub entries: Vec<Entry>,

    /// Entries dropped because a field failed
    pub skipped: Vec<SkippedEntry>,

    /// Whether `ul#entry-item-list` exists at all
    pub has_entry_list: bool,

    /// Last page indicator, when the pager exposes one
    pub page_count: Option<u32>,
}

/// A malformed entry and why it was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// 0-based position among the page's entry elements
    pub position: usize,
    pub reason: ParseError,
}

/// Topic page parser
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryParser;

impl EntryParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a topic page
    pub fn parse_page(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let page_count = Self::page_count(&document);

        let Some(list) = document.select(&ENTRY_LIST).next() else {
            return ParsedPage {
                page_count,
                ..ParsedPage::default()
            };
        };

        let mut page = ParsedPage {
            has_entry_list: true,
            page_count,
            ..ParsedPage::default()
        };

        for (position, item) in list.select(&ENTRY_ITEM).enumerate() {
            match self.extract_entry(item) {
                Ok(entry) => page.entries.push(entry),
                Err(reason) => {
                    tracing::warn!(
                        position,
                        entry_id = item.value().attr("data-id").unwrap_or("?"),
                        error = %reason,
                        "Skipping malformed entry"
                    );
                    page.skipped.push(SkippedEntry { position, reason });
                }
            }
        }

        page
    }

    /// Extract one entry from its `li` element
    ///
    /// # Errors
    ///
    /// `ParseError::MissingField` when author, text or date is absent or
    /// blank; `ParseError::InvalidFavoriteCount` when the count is not a
    /// non-negative integer. A missing count attribute reads as `0`.
    pub fn extract_entry(&self, item: ElementRef<'_>) -> Result<Entry, ParseError> {
        let author = Self::extract_author(item)?;

        let text = item
            .select(&ENTRY_CONTENT)
            .next()
            .map(sanitize::text_with_breaks)
            .filter(|t| !t.is_empty())
            .ok_or(ParseError::MissingField("text"))?;

        let date = item
            .select(&ENTRY_DATE)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|d| !d.is_empty())
            .ok_or(ParseError::MissingField("date"))?;

        let favorite_count = match item.value().attr(FAVORITE_COUNT_ATTR) {
            None => 0,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ParseError::InvalidFavoriteCount(raw.to_string()))?,
        };

        Ok(Entry {
            author,
            text,
            date,
            favorite_count,
        })
    }

    fn extract_author(item: ElementRef<'_>) -> Result<String, ParseError> {
        let from_attr = item
            .value()
            .attr(AUTHOR_ATTR)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        from_attr
            .or_else(|| {
                item.select(&ENTRY_AUTHOR)
                    .next()
                    .map(|el| normalize_whitespace(&el.text().collect::<String>()))
                    .filter(|a| !a.is_empty())
            })
            .ok_or(ParseError::MissingField("author"))
    }

    /// Read the last page indicator from the pager
    ///
    /// Prefers `data-pagecount`; otherwise takes the highest all-digit link
    /// label inside the pager. `None` when neither exists.
    pub fn page_count(document: &Html) -> Option<u32> {
        let pager = document.select(&PAGER).next()?;

        if let Some(count) = pager
            .value()
            .attr(PAGE_COUNT_ATTR)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            return Some(count);
        }

        pager
            .select(&PAGER_LINK)
            .filter_map(|link| {
                let label = link.text().collect::<String>();
                let label = label.trim();
                if !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()) {
                    label.parse::<u32>().ok()
                } else {
                    None
                }
            })
            .max()
            .filter(|&n| n > 0)
    }
}
