//! Error types for the pipeline module.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::{FetchError, TransportError};
use crate::integrity::IntegrityError;

/// Errors that abort a pipeline invocation.
///
/// Merge failures are not listed here: they are recorded in the report and
/// the fetched files stay valid.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file transfer failed.
    #[error("failed to download {file}: {source}")]
    Transport {
        /// Remote file name.
        file: String,
        /// The transport failure.
        #[source]
        source: TransportError,
    },

    /// A local filesystem operation failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The item identifier cannot be used as a directory name.
    #[error("invalid item identifier '{identifier}'")]
    InvalidIdentifier {
        /// The rejected identifier.
        identifier: String,
    },

    /// A remote file name would resolve outside the item directory.
    #[error("refusing unsafe file name '{file}'")]
    UnsafeFileName {
        /// The rejected file name.
        file: String,
    },

    /// Cancellation was requested between two fetches.
    #[error("interrupted after {completed} file(s)")]
    Interrupted {
        /// Files fetched or skipped before the interruption.
        completed: usize,
    },
}

impl PipelineError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Transport { file, source } => Self::Transport { file, source },
            FetchError::Write { path, source }
            | FetchError::HashCheck {
                source: IntegrityError::Io { path, source },
                ..
            } => Self::Io { path, source },
        }
    }
}
