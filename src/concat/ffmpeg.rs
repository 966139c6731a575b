//! ffmpeg-backed [`MergeTool`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{CodecMode, ConcatError, MergeTool, render_concat_list};

/// Executable used when none is configured.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Keep this much of ffmpeg's stderr in error reports.
const STDERR_TAIL_BYTES: usize = 4096;

/// Concatenates audio with the ffmpeg concat demuxer.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
    list_dir: Option<PathBuf>,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG)
    }
}

impl Ffmpeg {
    /// Creates a merge tool running the given executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            list_dir: None,
        }
    }

    /// Writes concat list files into `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_list_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.list_dir = Some(dir.into());
        self
    }

    /// The configured executable.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Builds the argument list for one concat run.
    ///
    /// `-n` makes ffmpeg fail instead of replacing an existing output.
    #[must_use]
    pub fn concat_args(list_file: &Path, output: &Path, mode: CodecMode) -> Vec<String> {
        let codec = match mode {
            CodecMode::StreamCopy => "copy",
            CodecMode::Pcm16Reencode => "pcm_s16le",
        };
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-n".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_file.to_string_lossy().into_owned(),
            "-c".to_string(),
            codec.to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl MergeTool for Ffmpeg {
    async fn check_available(&self) -> Result<(), ConcatError> {
        let status = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| ConcatError::tool_unavailable(&self.binary, e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(ConcatError::tool_unavailable(
                &self.binary,
                format!("`-version` exited with {status}"),
            ))
        }
    }

    #[instrument(skip(self, inputs), fields(parts = inputs.len(), output = %output.display()))]
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConcatError> {
        if inputs.is_empty() {
            return Err(ConcatError::NoInputs);
        }

        let list = render_concat_list(inputs)?;
        // Removed when dropped, on every return path below.
        let mut builder = tempfile::Builder::new();
        builder.prefix("audiofetch-concat-").suffix(".txt");
        let mut list_file = match &self.list_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|source| ConcatError::ListFile { source })?;
        list_file
            .write_all(list.as_bytes())
            .and_then(|()| list_file.flush())
            .map_err(|source| ConcatError::ListFile { source })?;

        let mode = CodecMode::for_output(output);
        let args = Self::concat_args(list_file.path(), output, mode);
        debug!(?mode, ?args, "running ffmpeg");

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ConcatError::Spawn {
                tool: self.binary.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ConcatError::ToolFailed {
                output: output.to_path_buf(),
                status: result.status.to_string(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        let produced = tokio::fs::metadata(output)
            .await
            .is_ok_and(|meta| meta.is_file() && meta.len() > 0);
        if !produced {
            return Err(ConcatError::NoOutput {
                output: output.to_path_buf(),
            });
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &trimmed[start..])
}
