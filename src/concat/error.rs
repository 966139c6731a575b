//! Error types for the concat module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from driving the external merge tool.
#[derive(Debug, Error)]
pub enum ConcatError {
    /// The merge tool could not be run at all.
    #[error("merge tool not available at {tool}: {reason}")]
    ToolUnavailable {
        /// Configured executable.
        tool: PathBuf,
        /// Why the availability check failed.
        reason: String,
    },

    /// A merge was requested with an empty input list.
    #[error("no files to concatenate")]
    NoInputs,

    /// An input path could not be made absolute.
    #[error("failed to get absolute path for {path}: {source}")]
    AbsolutePath {
        /// The input path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The temporary concat list could not be written.
    #[error("failed to create concat list file: {source}")]
    ListFile {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The merge process could not be spawned.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Configured executable.
        tool: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The merge process exited unsuccessfully.
    #[error("concat failed for {output} ({status})\nOutput: {stderr}")]
    ToolFailed {
        /// Intended output file.
        output: PathBuf,
        /// Exit status description.
        status: String,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// The output name is taken by a file that is not part of the set.
    #[error("refusing to overwrite existing file {output}")]
    OutputExists {
        /// Existing file.
        output: PathBuf,
    },

    /// The merge process reported success but left no usable output.
    #[error("concat produced no output at {output}")]
    NoOutput {
        /// Expected output file.
        output: PathBuf,
    },
}

impl ConcatError {
    /// Creates a tool-unavailable error.
    pub fn tool_unavailable(tool: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Returns true when the tool itself could not be run.
    #[must_use]
    pub fn is_tool_unavailable(&self) -> bool {
        matches!(self, Self::ToolUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_unavailable_display_names_tool() {
        let error = ConcatError::tool_unavailable("/opt/ffmpeg", "No such file or directory");
        let msg = error.to_string();
        assert!(msg.contains("/opt/ffmpeg"), "Expected tool in: {msg}");
        assert!(error.is_tool_unavailable());
    }

    #[test]
    fn test_tool_failed_display_includes_output() {
        let error = ConcatError::ToolFailed {
            output: PathBuf::from("/music/Show.mp3"),
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("Show.mp3"));
        assert!(msg.contains("Invalid data"));
        assert!(!error.is_tool_unavailable());
    }
}
