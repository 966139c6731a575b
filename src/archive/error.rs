//! Error types for the archive client.

use thiserror::Error;

/// Errors from search and metadata requests.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL cannot be used.
    #[error("invalid base URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// Network-level failure.
    #[error("request to {url} failed: {source}")]
    Network {
        /// The URL requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP status.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        /// The URL requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The URL requested.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The metadata endpoint knows nothing about the identifier.
    #[error("item '{identifier}' not found")]
    ItemNotFound {
        /// The identifier requested.
        identifier: String,
    },
}

impl ArchiveError {
    /// Creates a network error, promoting timeouts to [`ArchiveError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}
