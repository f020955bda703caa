//! Unified error handling for the eksi-scraper crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors available where a caller needs the detail.
//!
//! # Architecture
//!
//! - [`ScraperErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use eksi_scraper::error::{Error, ScraperErrorTrait};
//!
//! fn report(err: &Error) {
//!     tracing::error!(category = err.category().as_str(), error = %err, "run failed");
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::utils::error::{CrawlerError, FetchError, ParseError};

/// Common trait for scraper error types
pub trait ScraperErrorTrait: std::error::Error {
    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Output file and I/O errors
    Storage,
    /// Configuration, validation and input errors
    Config,
}

impl ErrorCategory {
    /// Short human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the eksi-scraper crate
#[derive(Error, Debug)]
pub enum Error {
    /// Crawl loop errors
    #[error("Crawler error: {0}")]
    Crawler(#[from] CrawlerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl ScraperErrorTrait for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawler(CrawlerError::InvalidTopicUrl(_)) | Self::Config(_) => {
                ErrorCategory::Config
            }
            Self::Crawler(_) => ErrorCategory::Network,
            Self::Io(_) | Self::Csv(_) => ErrorCategory::Storage,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
