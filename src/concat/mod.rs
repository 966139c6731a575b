//! Merging multi-part audio through an external concatenation tool.
//!
//! [`MergeTool`] is the seam the pipeline drives; [`Ffmpeg`] implements it
//! with the ffmpeg concat demuxer. The codec mode is chosen from the output
//! extension: WAV parts are re-encoded to 16-bit PCM because their headers
//! cannot be spliced, everything else is stream-copied.

mod error;
mod ffmpeg;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::multipart::split_extension;

pub use error::ConcatError;
pub use ffmpeg::{DEFAULT_FFMPEG, Ffmpeg};

/// How the merge tool treats the encoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecMode {
    /// Concatenate encoded packets without re-encoding.
    StreamCopy,
    /// Re-encode to signed 16-bit little-endian PCM.
    Pcm16Reencode,
}

impl CodecMode {
    /// Picks the mode for an output file extension (without the dot).
    ///
    /// Unrecognized extensions use stream copy.
    #[must_use]
    pub fn for_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Self::Pcm16Reencode,
            _ => Self::StreamCopy,
        }
    }

    /// Picks the mode for an output path.
    ///
    /// The extension is split the same way part-set output names are built,
    /// so a bare `.wav` name still selects PCM re-encoding.
    #[must_use]
    pub fn for_output(output: &Path) -> Self {
        let name = output
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let (_, extension) = split_extension(&name);
        Self::for_extension(extension.trim_start_matches('.'))
    }
}

/// External tool that concatenates audio files.
#[async_trait]
pub trait MergeTool: Send + Sync {
    /// Verifies the tool can be invoked.
    ///
    /// # Errors
    ///
    /// Returns [`ConcatError::ToolUnavailable`] when it cannot.
    async fn check_available(&self) -> Result<(), ConcatError>;

    /// Concatenates `inputs`, in order, into `output`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConcatError`] when the tool fails or leaves no output.
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConcatError>;
}

/// Renders the concat-demuxer list: one quoted absolute path per line.
///
/// # Errors
///
/// Returns [`ConcatError::AbsolutePath`] if a path cannot be made absolute.
pub fn render_concat_list(inputs: &[PathBuf]) -> Result<String, ConcatError> {
    let mut list = String::new();
    for input in inputs {
        let absolute = std::path::absolute(input).map_err(|source| ConcatError::AbsolutePath {
            path: input.clone(),
            source,
        })?;
        let quoted = absolute.to_string_lossy().replace('\'', r"'\''");
        list.push_str("file '");
        list.push_str(&quoted);
        list.push_str("'\n");
    }
    Ok(list)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_mode_by_extension() {
        assert_eq!(CodecMode::for_extension("mp3"), CodecMode::StreamCopy);
        assert_eq!(CodecMode::for_extension("flac"), CodecMode::StreamCopy);
        assert_eq!(CodecMode::for_extension("ogg"), CodecMode::StreamCopy);
        assert_eq!(CodecMode::for_extension("wav"), CodecMode::Pcm16Reencode);
        assert_eq!(CodecMode::for_extension("WAVE"), CodecMode::Pcm16Reencode);
        assert_eq!(CodecMode::for_extension("m4a"), CodecMode::StreamCopy);
    }

    #[test]
    fn test_codec_mode_for_output_path() {
        assert_eq!(
            CodecMode::for_output(Path::new("/x/Show.WAV")),
            CodecMode::Pcm16Reencode
        );
        assert_eq!(
            CodecMode::for_output(Path::new("/x/no_extension")),
            CodecMode::StreamCopy
        );
    }

    #[test]
    fn test_codec_mode_for_output_with_empty_base() {
        let sets = crate::multipart::detect(&["_1.wav", "_2.wav"]);
        assert_eq!(sets[0].output_name, ".wav");

        assert_eq!(
            CodecMode::for_output(&Path::new("/x").join(&sets[0].output_name)),
            CodecMode::Pcm16Reencode
        );
    }

    #[test]
    fn test_render_concat_list_one_quoted_absolute_path_per_line() {
        let list = render_concat_list(&[
            PathBuf::from("/music/a_1.mp3"),
            PathBuf::from("/music/a_2.mp3"),
        ])
        .unwrap();

        assert_eq!(list, "file '/music/a_1.mp3'\nfile '/music/a_2.mp3'\n");
    }

    #[test]
    fn test_render_concat_list_escapes_single_quotes() {
        let list = render_concat_list(&[PathBuf::from("/music/Rock'n'Roll_1.mp3")]).unwrap();

        assert_eq!(list, "file '/music/Rock'\\''n'\\''Roll_1.mp3'\n");
    }

    #[test]
    fn test_render_concat_list_makes_relative_paths_absolute() {
        let list = render_concat_list(&[PathBuf::from("part_1.mp3")]).unwrap();
        let line = list.trim_end();
        let path = line
            .strip_prefix("file '")
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap();

        assert!(Path::new(path).is_absolute(), "expected absolute path in: {line}");
    }
}
