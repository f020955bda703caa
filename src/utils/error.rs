//! Error types for the scraper
//!
//! This module defines the domain-specific error types used by the fetcher,
//! the entry parser and the crawl loop.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (connection refused, DNS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could succeed
    ///
    /// Timeouts, transport failures and the statuses 429/500/502/503/504 are
    /// retryable. Client errors such as 403 or 404 are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Http(_) => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::MaxRetriesExceeded { .. } => false,
        }
    }
}

/// Errors raised while extracting a single field of an entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Selector yielded nothing, or only whitespace
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// `data-favorite-count` present but not a non-negative integer
    #[error("Invalid favorite count: {0:?}")]
    InvalidFavoriteCount(String),
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The input is not an absolute http(s) topic URL
    #[error("Invalid topic URL: {0}")]
    InvalidTopicUrl(String),

    /// Page 1 could not be fetched, so there is nothing to save
    #[error("First page {url} is unreachable: {source}")]
    FirstPageUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            assert!(FetchError::ServerError(status).is_retryable(), "{status}");
        }
        for status in [400, 401, 403, 404, 410] {
            assert!(!FetchError::ServerError(status).is_retryable(), "{status}");
        }
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(FetchError::Timeout.is_retryable());
    }

    #[test]
    fn test_max_retries_message_includes_last_error() {
        let err = FetchError::MaxRetriesExceeded {
            attempts: 4,
            last: Box::new(FetchError::ServerError(503)),
        };
        let msg = err.to_string();
        assert!(msg.contains("4 attempts"));
        assert!(msg.contains("503"));
        assert!(!err.is_retryable());
    }
}
