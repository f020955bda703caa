//! Configuration management for the topic scraper
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags (applied by the binary).

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::utils::retry::RetryConfig;

/// Accepted values for `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Output file configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Hard upper bound on pages fetched, regardless of the page indicator
    pub max_pages: u32,

    /// Lower bound of the politeness delay between pages
    pub min_delay_ms: u64,

    /// Upper bound of the politeness delay between pages
    pub max_delay_ms: u64,

    /// Lower bound of the pause before the first page
    pub initial_delay_min_ms: u64,

    /// Upper bound of the pause before the first page
    pub initial_delay_max_ms: u64,

    /// Rate limit (requests per second), retries included
    pub rate_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retry attempts per page after the first try
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries
    pub retry_base_delay_ms: u64,

    /// Fixed user agent; rotates through a built-in pool when unset
    pub user_agent: Option<String>,
}

/// Output file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV file path
    pub path: PathBuf,

    /// Prefix the file with a UTF-8 byte order mark
    pub utf8_bom: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,

    /// Mirror log lines into this file
    pub file: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            min_delay_ms: 2000,
            max_delay_ms: 5000,
            initial_delay_min_ms: 1000,
            initial_delay_max_ms: 3000,
            rate_limit: 1,
            request_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            user_agent: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("entries.csv"),
            utf8_bom: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
            file: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse TOML config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Override fields from `EKSI_*` environment variables
    pub fn apply_env(&mut self) {
        let crawler = &mut self.crawler;
        if let Some(v) = env_parse("EKSI_MAX_PAGES") {
            crawler.max_pages = v;
        }
        if let Some(v) = env_parse("EKSI_MIN_DELAY_MS") {
            crawler.min_delay_ms = v;
        }
        if let Some(v) = env_parse("EKSI_MAX_DELAY_MS") {
            crawler.max_delay_ms = v;
        }
        if let Some(v) = env_parse("EKSI_INITIAL_DELAY_MIN_MS") {
            crawler.initial_delay_min_ms = v;
        }
        if let Some(v) = env_parse("EKSI_INITIAL_DELAY_MAX_MS") {
            crawler.initial_delay_max_ms = v;
        }
        if let Some(v) = env_parse("EKSI_RATE_LIMIT") {
            crawler.rate_limit = v;
        }
        if let Some(v) = env_parse("EKSI_REQUEST_TIMEOUT") {
            crawler.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("EKSI_MAX_RETRIES") {
            crawler.max_retries = v;
        }
        if let Ok(v) = std::env::var("EKSI_USER_AGENT") {
            crawler.user_agent = Some(v);
        }

        if let Ok(v) = std::env::var("EKSI_OUTPUT") {
            self.output.path = PathBuf::from(v);
        }

        if let Ok(v) = std::env::var("EKSI_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("EKSI_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Ok(v) = std::env::var("EKSI_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let crawler = &self.crawler;

        if crawler.max_pages == 0 {
            return Err(Error::config("max_pages must be greater than 0"));
        }

        if crawler.rate_limit == 0 {
            return Err(Error::config("rate_limit must be greater than 0"));
        }

        if crawler.min_delay_ms > crawler.max_delay_ms {
            return Err(Error::config(format!(
                "min_delay_ms ({}) must not exceed max_delay_ms ({})",
                crawler.min_delay_ms, crawler.max_delay_ms
            )));
        }

        if crawler.initial_delay_min_ms > crawler.initial_delay_max_ms {
            return Err(Error::config(format!(
                "initial_delay_min_ms ({}) must not exceed initial_delay_max_ms ({})",
                crawler.initial_delay_min_ms, crawler.initial_delay_max_ms
            )));
        }

        if crawler.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than 0"));
        }

        if let Some(agent) = &crawler.user_agent {
            if agent.trim().is_empty() || HeaderValue::from_str(agent).is_err() {
                return Err(Error::config(format!(
                    "user_agent {agent:?} is not a valid header value"
                )));
            }
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(Error::config("output path must not be empty"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config("log format must be \"text\" or \"json\""));
        }

        Ok(())
    }

    /// Politeness delay range between pages
    #[must_use]
    pub fn page_delay(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.crawler.min_delay_ms),
            Duration::from_millis(self.crawler.max_delay_ms),
        )
    }

    /// Pause range before the first page
    #[must_use]
    pub fn initial_delay(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.crawler.initial_delay_min_ms),
            Duration::from_millis(self.crawler.initial_delay_max_ms),
        )
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Backoff settings for page requests
    #[must_use]
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.crawler.max_retries,
            base_delay_ms: self.crawler.retry_base_delay_ms,
            ..RetryConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.path, PathBuf::from("entries.csv"));
        assert_eq!(config.crawler.max_pages, 1000);
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let mut config = Config::default();
        config.crawler.min_delay_ms = 6000;
        config.crawler.max_delay_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_initial_delay_rejected() {
        let mut config = Config::default();
        config.crawler.initial_delay_min_ms = 3000;
        config.crawler.initial_delay_max_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_delay_defaults() {
        let config = Config::default();
        assert_eq!(
            config.initial_delay(),
            (Duration::from_secs(1), Duration::from_secs(3))
        );
        assert_eq!(
            config.page_delay(),
            (Duration::from_secs(2), Duration::from_secs(5))
        );
    }

    #[test]
    fn test_user_agent_must_be_header_text() {
        let mut config = Config::default();
        config.crawler.user_agent = Some("Mozilla/5.0\n(evil)".into());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("user_agent"));

        config.crawler.user_agent = Some("   ".into());
        assert!(config.validate().is_err());

        config.crawler.user_agent = Some("Mozilla/5.0 (X11; Linux x86_64)".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "loud".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log level"));

        config.logging.level = "WARN".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_config_from_crawler_settings() {
        let mut config = Config::default();
        config.crawler.max_retries = 5;
        config.crawler.retry_base_delay_ms = 10;
        let retry = config.retry();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.calculate_delay(2), Duration::from_millis(20));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max_pages = 7

            [output]
            utf8_bom = true
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_pages, 7);
        assert_eq!(config.crawler.max_retries, 3);
        assert!(config.output.utf8_bom);
        assert_eq!(config.output.path, PathBuf::from("entries.csv"));
        assert_eq!(config.logging.format, "text");
    }
}
