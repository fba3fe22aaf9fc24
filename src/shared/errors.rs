//! Error handling for the application

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Market-data API errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("{what} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        what: String,
        attempts: u32,
        last_error: Box<FetchError>,
    },
}

impl FetchError {
    /// Transport failures, timeouts, rate limiting and server errors are worth another try.
    /// Anything the API answered deliberately is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => !e.is_decode(),
            FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Decode { .. }
            | FetchError::EmptyResponse(_)
            | FetchError::InvalidUrl(_)
            | FetchError::InvalidHeader(_) => false,
            FetchError::RetriesExhausted { .. } => false,
        }
    }
}

/// Snapshot file errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot {name} is not valid JSON: {source}")]
    Serde {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Price alert errors
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Alert price must be positive, got {0}")]
    InvalidPrice(f64),

    #[error("Unknown alert direction: {0} (expected 'above' or 'below')")]
    InvalidDirection(String),

    #[error("Alert not found: {0}")]
    NotFound(String),

    #[error("Alert store error: {0}")]
    Store(#[from] SnapshotError),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("No market data available: {0}")]
    NoData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_retry_classification() {
        let rate_limited = FetchError::Status { status: 429, url: "u".to_string() };
        let server = FetchError::Status { status: 503, url: "u".to_string() };
        let not_found = FetchError::Status { status: 404, url: "u".to_string() };

        assert!(rate_limited.is_retryable());
        assert!(server.is_retryable());
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_malformed_responses_are_not_retried() {
        assert!(!FetchError::EmptyResponse("u".to_string()).is_retryable());
        assert!(!FetchError::Decode { url: "u".to_string(), reason: "eof".to_string() }.is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
    }
}
