//! Materializing remote files on local disk.
//!
//! The [`Fetcher`] streams one named file of a remote item into a
//! destination path. Transport is delegated to a [`FileSource`], which the
//! archive client implements over HTTPS; tests substitute in-memory sources.
//!
//! [`Fetcher::materialize`] pairs a fetch with the integrity check so a file
//! whose local copy already matches the published hash is not transferred
//! again.

mod error;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

pub use error::{FetchError, TransportError};

use crate::integrity;

/// Body of a remote file, delivered in chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// One file listed in a remote item's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileDescriptor {
    /// File name, unique within the item.
    pub name: String,
    /// Free-form format label (e.g. `"VBR MP3"`).
    pub format_label: String,
    /// Published MD5 digest, when the service provides one.
    pub content_hash: Option<String>,
}

impl RemoteFileDescriptor {
    /// Creates a descriptor. An empty hash is stored as `None`.
    pub fn new(
        name: impl Into<String>,
        format_label: impl Into<String>,
        content_hash: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            format_label: format_label.into(),
            content_hash: content_hash.filter(|hash| !hash.trim().is_empty()),
        }
    }
}

/// Why a file was not transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The local copy already matches the published hash.
    HashMatch,
}

/// Result of materializing one file.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The file was transferred.
    Downloaded {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// The transfer was not needed.
    Skipped(SkipReason),
    /// The hash check or the transfer failed.
    Failed(FetchError),
}

/// Transport collaborator: fetches the body of a named file of a remote item.
///
/// Any non-success status must surface as a [`TransportError`].
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Opens the body of `file_name` within `item_id`.
    async fn fetch_bytes(&self, item_id: &str, file_name: &str)
    -> Result<ByteStream, TransportError>;
}

/// Streams remote files to disk through a [`FileSource`].
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn FileSource>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Creates a fetcher over the given transport.
    #[must_use]
    pub fn new(source: Arc<dyn FileSource>) -> Self {
        Self { source }
    }

    /// Transfers the full body of `file_name` into `dest_path`.
    ///
    /// The destination is created or truncated. One call is one attempt; a
    /// failed transfer removes the partial file.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if the exchange fails or the status is not a success
    /// - [`FetchError::Write`] if the local write fails
    #[instrument(skip(self, dest_path), fields(dest = %dest_path.display()))]
    pub async fn fetch(
        &self,
        item_id: &str,
        file_name: &str,
        dest_path: &Path,
    ) -> Result<u64, FetchError> {
        let stream = self
            .source
            .fetch_bytes(item_id, file_name)
            .await
            .map_err(|e| FetchError::transport(file_name, e))?;

        let file = File::create(dest_path)
            .await
            .map_err(|e| FetchError::write(dest_path, e))?;

        let result = stream_to_file(file, stream, file_name, dest_path).await;
        if result.is_err() {
            debug!(path = %dest_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(dest_path).await;
        }
        let bytes = result?;

        info!(file = %file_name, bytes, "download complete");
        Ok(bytes)
    }

    /// Makes `descriptor` present at `dest_path`, skipping the transfer when
    /// the local copy already matches the published hash.
    ///
    /// Without a published hash the file is always transferred.
    pub async fn materialize(
        &self,
        item_id: &str,
        descriptor: &RemoteFileDescriptor,
        dest_path: &Path,
    ) -> DownloadOutcome {
        if let Some(expected) = descriptor.content_hash.as_deref() {
            match integrity::already_present(dest_path, expected).await {
                Ok(true) => {
                    debug!(file = %descriptor.name, "hash matches, skipping");
                    return DownloadOutcome::Skipped(SkipReason::HashMatch);
                }
                Ok(false) => {}
                Err(e) => {
                    return DownloadOutcome::Failed(FetchError::hash_check(&descriptor.name, e));
                }
            }
        }

        match self.fetch(item_id, &descriptor.name, dest_path).await {
            Ok(bytes) => DownloadOutcome::Downloaded { bytes },
            Err(e) => DownloadOutcome::Failed(e),
        }
    }
}

async fn stream_to_file(
    file: File,
    mut stream: ByteStream,
    file_name: &str,
    dest_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::transport(file_name, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::write(dest_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::write(dest_path, e))?;

    Ok(bytes_written)
}
