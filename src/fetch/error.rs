//! Error types for the fetch module.

use std::path::PathBuf;

use thiserror::Error;

use crate::integrity::IntegrityError;

/// Failure of the network exchange with the remote service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("network error fetching {url}: {source}")]
    Request {
        /// The URL being fetched.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Timed out before the response completed.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body stream broke off mid-transfer.
    #[error("body stream interrupted fetching {url}: {source}")]
    Body {
        /// The URL being streamed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Creates a request error, promoting timeouts to [`TransportError::Timeout`].
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Request {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Creates a body stream error.
    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }
}

/// Errors from materializing one remote file locally.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transfer of `file` did not complete with a success status.
    #[error("failed to download {file}: {source}")]
    Transport {
        /// Remote file name.
        file: String,
        /// The transport failure.
        #[source]
        source: TransportError,
    },

    /// Writing the local copy failed.
    #[error("IO error writing {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Hashing an existing local copy failed.
    #[error("failed to check existing copy of {file}: {source}")]
    HashCheck {
        /// Remote file name.
        file: String,
        /// The hashing failure.
        #[source]
        source: IntegrityError,
    },
}

impl FetchError {
    /// Creates a transport error for a named remote file.
    pub fn transport(file: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            file: file.into(),
            source,
        }
    }

    /// Creates a local write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a hash-check error for a named remote file.
    pub fn hash_check(file: impl Into<String>, source: IntegrityError) -> Self {
        Self::HashCheck {
            file: file.into(),
            source,
        }
    }

    /// Returns true for failures of the network exchange.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_status_display_names_file_and_status() {
        let error = FetchError::transport(
            "Show_Part_1.mp3",
            TransportError::status("https://archive.org/download/x/Show_Part_1.mp3", 404),
        );
        let msg = error.to_string();
        assert!(msg.contains("Show_Part_1.mp3"), "Expected file in: {msg}");
        assert!(msg.contains("404"), "Expected status in: {msg}");
        assert!(error.is_transport());
    }

    #[test]
    fn test_write_error_display_names_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = FetchError::write("/tmp/out/track.flac", io_error);
        assert!(error.to_string().contains("/tmp/out/track.flac"));
        assert!(!error.is_transport());
    }
}
