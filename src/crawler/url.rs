//! Topic URL handling
//!
//! A topic is addressed by its base URL, e.g.
//! `https://eksisozluk.com/some-title--123456`. Pages are selected with the
//! `p` query parameter; anything else in the query (sorting, day filters) is
//! dropped so every page comes from the same listing.

use url::Url;

use crate::utils::error::CrawlerError;

/// Query parameter carrying the page number
pub const PAGE_PARAM: &str = "p";

/// Normalized topic address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicUrl {
    base: Url,
}

impl TopicUrl {
    /// Parse and normalize a topic URL
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::InvalidTopicUrl` unless the input is an
    /// absolute `http` or `https` URL with a host.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksi_scraper::crawler::url::TopicUrl;
    ///
    /// let topic = TopicUrl::parse("https://eksisozluk.com/rust--5432?a=popular").unwrap();
    /// assert_eq!(topic.as_str(), "https://eksisozluk.com/rust--5432");
    /// assert_eq!(topic.page_url(3), "https://eksisozluk.com/rust--5432?p=3");
    /// ```
    pub fn parse(input: &str) -> Result<Self, CrawlerError> {
        let mut base = Url::parse(input.trim())
            .map_err(|e| CrawlerError::InvalidTopicUrl(format!("{input}: {e}")))?;

        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(CrawlerError::InvalidTopicUrl(input.to_string()));
        }

        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    /// Address of the given 1-based page
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
        url.into()
    }

    /// Normalized topic URL without query
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }
}

impl std::fmt::Display for TopicUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
