//! Logical audio formats and matching against remote format labels.
//!
//! The archive labels each file with a free-form format string such as
//! `"VBR MP3"`, `"Flac"` or `"Ogg Vorbis"`. A [`LogicalAudioFormat`] is the
//! preference category a user asks for; [`matches`] decides whether a given
//! label belongs to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Preference category for audio downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalAudioFormat {
    Flac,
    Wave,
    Mp3,
    Ogg,
}

/// Default preference order: lossless first.
pub const DEFAULT_FORMAT_PREFERENCE: [LogicalAudioFormat; 4] = [
    LogicalAudioFormat::Flac,
    LogicalAudioFormat::Wave,
    LogicalAudioFormat::Mp3,
    LogicalAudioFormat::Ogg,
];

impl LogicalAudioFormat {
    /// Lower-case tokens whose presence in a format label selects this format.
    #[must_use]
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            Self::Flac => &["flac"],
            Self::Wave => &["wave", "wav"],
            Self::Mp3 => &["mp3"],
            Self::Ogg => &["ogg", "vorbis"],
        }
    }

    /// Returns the stable lower-case name used in config and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Wave => "wave",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
        }
    }
}

impl fmt::Display for LogicalAudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a format name is not one of the known categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audio format '{0}' (expected one of: flac, wave, mp3, ogg)")]
pub struct UnknownFormat(pub String);

impl FromStr for LogicalAudioFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flac" => Ok(Self::Flac),
            "wave" | "wav" => Ok(Self::Wave),
            "mp3" => Ok(Self::Mp3),
            "ogg" | "vorbis" => Ok(Self::Ogg),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Parses a comma-separated preference list such as `"flac,mp3"`.
///
/// Empty entries are ignored; order is preserved.
///
/// # Errors
///
/// Returns [`UnknownFormat`] for the first entry that is not a known format.
pub fn parse_format_list(raw: &str) -> Result<Vec<LogicalAudioFormat>, UnknownFormat> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}

/// Returns true if `format_label` belongs to `wanted`.
///
/// Matching is a case-insensitive substring test against the format's tokens.
#[must_use]
pub fn matches(format_label: &str, wanted: LogicalAudioFormat) -> bool {
    let label = format_label.to_lowercase();
    wanted.tokens().iter().any(|token| label.contains(token))
}
