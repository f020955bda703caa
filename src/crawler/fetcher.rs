//! HTTP fetcher with rate limiting, header spoofing and retry
//!
//! This module provides the page fetcher used by the topic crawler:
//! - User-Agent rotation (or a fixed configured agent)
//! - Rate limiting with governor
//! - Bounded retry with exponential backoff
//! - Charset-aware body decoding

use encoding_rs::{Encoding, UTF_8};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::header::HeaderValue;
use reqwest::{Client, Response};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::Config;
use crate::crawler::headers::{build_browser_headers, random_user_agent};
use crate::utils::error::FetchError;
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Topic page fetcher
///
/// Every call waits on the rate limiter, sends browser-like headers and
/// retries transient failures. The response body is read to completion
/// inside [`PageFetcher::fetch_page`], so the connection goes back to the
/// pool before the caller starts parsing.
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Backoff policy
    retry: RetryConfig,

    /// Fixed user agent; `None` rotates through the built-in pool
    user_agent: Option<String>,
}

impl PageFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(
            requests_per_second,
            RetryConfig::default(),
            Duration::from_secs(30),
        )
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `retry` - Backoff policy for transient failures
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        retry: RetryConfig,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            retry,
            user_agent: None,
        })
    }

    /// Build a fetcher from the crawler section of [`Config`]
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = Self::with_config(
            config.crawler.rate_limit,
            config.retry(),
            config.request_timeout(),
        )?;
        Ok(match &config.crawler.user_agent {
            Some(agent) => fetcher.with_user_agent(agent.clone()),
            None => fetcher,
        })
    }

    /// Send this user agent on every request instead of rotating
    ///
    /// An agent that is blank or not valid header text is ignored and the
    /// built-in pool keeps rotating, so every request still carries one.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        if user_agent.trim().is_empty() || HeaderValue::from_str(&user_agent).is_err() {
            tracing::warn!(user_agent = ?user_agent, "Unusable user agent, rotating built-in agents");
            self.user_agent = None;
        } else {
            self.user_agent = Some(user_agent);
        }
        self
    }

    /// Fetch a page with rate limiting and retry
    ///
    /// # Arguments
    ///
    /// * `url` - The page URL to fetch
    /// * `referer` - Value for the `Referer` header (the topic URL)
    ///
    /// # Errors
    ///
    /// Returns the non-retryable error as is, or
    /// `FetchError::MaxRetriesExceeded` once retries are used up
    pub async fn fetch_page(&self, url: &str, referer: &str) -> Result<String, FetchError> {
        with_retry_if(
            &self.retry,
            || self.fetch_once(url, referer),
            FetchError::is_retryable,
        )
        .await
        .map_err(|failure| {
            if failure.exhausted && failure.attempts > 1 {
                FetchError::MaxRetriesExceeded {
                    attempts: failure.attempts,
                    last: Box::new(failure.last_error),
                }
            } else {
                failure.last_error
            }
        })
    }

    /// Single attempt: wait for the limiter, send, check status, decode
    async fn fetch_once(&self, url: &str, referer: &str) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        let user_agent = match &self.user_agent {
            Some(agent) => agent.as_str(),
            None => random_user_agent(),
        };
        let headers = build_browser_headers(user_agent, referer);

        tracing::debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        self.decode_response(response).await
    }

    /// Read the whole body and decode it
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        Ok(decode_bytes(&bytes, &content_type))
    }
}

/// Decode a body using the `charset` from `Content-Type`
///
/// Unknown or missing charsets fall back to UTF-8; invalid sequences become
/// U+FFFD instead of failing the page.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> String {
    let encoding = charset_label(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Body contained invalid sequences");
    }
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        assert!(PageFetcher::new(1).is_ok());
        assert!(
            PageFetcher::with_config(5, RetryConfig::new(1), Duration::from_secs(10)).is_ok()
        );
    }

    #[test]
    fn test_zero_rate_falls_back_to_one() {
        assert!(PageFetcher::with_config(0, RetryConfig::new(0), Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_from_config_uses_fixed_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = Some("TestAgent/1.0".into());
        let fetcher = PageFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.user_agent.as_deref(), Some("TestAgent/1.0"));
        assert_eq!(fetcher.retry.max_retries, 3);
    }

    #[test]
    fn test_invalid_user_agent_keeps_rotation() {
        let fetcher = PageFetcher::new(1).unwrap().with_user_agent("Mozilla/5.0\n(evil)");
        assert_eq!(fetcher.user_agent, None);

        let fetcher = PageFetcher::new(1).unwrap().with_user_agent("  ");
        assert_eq!(fetcher.user_agent, None);
    }

    #[test]
    fn test_charset_label() {
        assert_eq!(
            charset_label("text/html; charset=UTF-8").as_deref(),
            Some("utf-8")
        );
        assert_eq!(
            charset_label("text/html;charset=\"windows-1254\"").as_deref(),
            Some("windows-1254")
        );
        assert_eq!(charset_label("text/html"), None);
    }

    #[test]
    fn test_decode_utf8() {
        let text = "şöyle güzel bir entry";
        assert_eq!(decode_bytes(text.as_bytes(), "text/html; charset=utf-8"), text);
        assert_eq!(decode_bytes(text.as_bytes(), "text/html"), text);
    }

    #[test]
    fn test_decode_windows_1254() {
        // "şğı" in windows-1254 (Turkish)
        let bytes: &[u8] = &[0xFE, 0xF0, 0xFD];
        assert_eq!(decode_bytes(bytes, "text/html; charset=windows-1254"), "şğı");
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let decoded = decode_bytes(&[b'o', b'k', 0xFF], "");
        assert!(decoded.starts_with("ok"));
        assert!(decoded.contains('\u{FFFD}'));
    }
}
