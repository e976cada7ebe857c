//! Error types for the GlStatus core library.

use thiserror::Error;

/// Core error type for status reporting.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not determine project path from remote URL: {0}")]
    Resolution(String),

    #[error("Failed to send status request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type alias for status reporting operations.
pub type Result<T> = std::result::Result<T, StatusError>;
