//! Skip-if-present checks based on the MD5 digests the archive publishes.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

/// Read buffer size for hashing local files.
const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Errors raised while hashing a local file.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The file exists but could not be opened or read.
    #[error("IO error hashing {path}: {source}")]
    Io {
        /// File being hashed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl IntegrityError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Computes the lower-case hex MD5 digest of the whole file at `path`.
///
/// # Errors
///
/// Returns [`IntegrityError::Io`] if the file cannot be opened or read.
pub async fn md5_hex(path: &Path) -> Result<String, IntegrityError> {
    let file = File::open(path)
        .await
        .map_err(|e| IntegrityError::io(path, e))?;
    digest_file(file, path).await
}

async fn digest_file(mut file: File, path: &Path) -> Result<String, IntegrityError> {
    let mut context = md5::Context::new();
    let mut buffer = vec![0_u8; HASH_CHUNK_SIZE];
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| IntegrityError::io(path, e))?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }
    Ok(format!("{:x}", context.compute()))
}

/// Returns true if `local_path` exists and its MD5 equals `expected_hash`.
///
/// A missing file is a normal `false`. The comparison ignores case. An empty
/// `expected_hash` never matches; callers should skip the check entirely when
/// the remote side publishes no hash.
///
/// # Errors
///
/// Returns [`IntegrityError::Io`] for any failure other than the file being absent.
pub async fn already_present(local_path: &Path, expected_hash: &str) -> Result<bool, IntegrityError> {
    let expected = expected_hash.trim();
    if expected.is_empty() {
        return Ok(false);
    }

    let file = match File::open(local_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            trace!(path = %local_path.display(), "no local copy");
            return Ok(false);
        }
        Err(e) => return Err(IntegrityError::io(local_path, e)),
    };

    let actual = digest_file(file, local_path).await?;
    let present = actual.eq_ignore_ascii_case(expected);
    debug!(
        path = %local_path.display(),
        expected = %expected,
        actual = %actual,
        present,
        "checked local copy"
    );
    Ok(present)
}
