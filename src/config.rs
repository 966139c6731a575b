//! Environment-based configuration.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `IA_MAX_RESULTS` | default number of search hits | `10` |
//! | `IA_DOWNLOAD_DIR` | download root | `$HOME/Downloads` |
//! | `IA_S3_ACCESS_KEY`, `IA_S3_SECRET_KEY` | API key pair | unset |
//! | `IA_FFMPEG` | merge tool executable | `ffmpeg` |
//! | `IA_CONCAT_ASK_THRESH` | ask-threshold | `5` |
//! | `IA_AUDIO_FORMATS` | preferred formats, comma separated | `flac,wave,mp3,ogg` |
//! | `IA_BASE_URL` | archive endpoint | `https://archive.org` |

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::constants::DEFAULT_BASE_URL;
use crate::concat::DEFAULT_FFMPEG;
use crate::format::{DEFAULT_FORMAT_PREFERENCE, LogicalAudioFormat, parse_format_list};
use crate::pipeline::{DEFAULT_ASK_THRESHOLD, PipelineSettings};

/// Default number of search hits.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No download directory is configured and no home directory is known.
    #[error("IA_DOWNLOAD_DIR is not set and the home directory is unknown")]
    NoDownloadDir,

    /// A resolved value violates a constraint.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Preferred formats, highest priority first.
    pub formats: Vec<LogicalAudioFormat>,
    /// Default number of search hits.
    pub max_results: u32,
    /// Download root.
    pub download_dir: PathBuf,
    /// Archive S3-style access key.
    pub access_key: Option<String>,
    /// Archive S3-style secret key.
    pub secret_key: Option<String>,
    /// Merge tool executable.
    pub ffmpeg: PathBuf,
    /// Set size at which automatic merging asks for confirmation.
    pub ask_threshold: usize,
    /// Archive endpoint.
    pub base_url: String,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparseable values or a missing
    /// download directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps variable names to values.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let max_results = match get("IA_MAX_RESULTS") {
            Some(raw) => parse_number("IA_MAX_RESULTS", &raw)?,
            None => DEFAULT_MAX_RESULTS,
        };

        let ask_threshold = match get("IA_CONCAT_ASK_THRESH") {
            Some(raw) => parse_number("IA_CONCAT_ASK_THRESH", &raw)?,
            None => DEFAULT_ASK_THRESHOLD,
        };

        let formats = match get("IA_AUDIO_FORMATS") {
            Some(raw) => parse_format_list(&raw).map_err(|e| ConfigError::InvalidValue {
                var: "IA_AUDIO_FORMATS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_FORMAT_PREFERENCE.to_vec(),
        };

        let download_dir = match get("IA_DOWNLOAD_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => get("HOME")
                .or_else(|| get("USERPROFILE"))
                .map(|home| PathBuf::from(home).join("Downloads"))
                .ok_or(ConfigError::NoDownloadDir)?,
        };

        Ok(Self {
            formats,
            max_results,
            download_dir,
            access_key: get("IA_S3_ACCESS_KEY"),
            secret_key: get("IA_S3_SECRET_KEY"),
            ffmpeg: get("IA_FFMPEG").map_or_else(|| PathBuf::from(DEFAULT_FFMPEG), PathBuf::from),
            ask_threshold,
            base_url: get("IA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `max_results` or `ask_threshold`
    /// is zero, or the format list is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::Invalid("max results must be greater than 0"));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::Invalid("audio format preference cannot be empty"));
        }
        if self.ask_threshold == 0 {
            return Err(ConfigError::Invalid("concat ask threshold must be greater than 0"));
        }
        Ok(())
    }

    /// `access:secret` when both keys are set.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some(format!("{access}:{secret}")),
            _ => None,
        }
    }

    /// Pipeline settings derived from this configuration.
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            formats: self.formats.clone(),
            download_root: self.download_dir.clone(),
            ask_threshold: self.ask_threshold,
        }
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("HOME", "/home/listener")]).unwrap();

        assert_eq!(config.max_results, 10);
        assert_eq!(config.ask_threshold, 5);
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.download_dir, PathBuf::from("/home/listener/Downloads"));
        assert_eq!(config.formats, DEFAULT_FORMAT_PREFERENCE.to_vec());
        assert_eq!(config.api_key(), None);
        assert_eq!(config.base_url, "https://archive.org");
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("IA_MAX_RESULTS", "25"),
            ("IA_DOWNLOAD_DIR", "/srv/audio"),
            ("IA_FFMPEG", "/opt/ffmpeg/bin/ffmpeg"),
            ("IA_CONCAT_ASK_THRESH", "3"),
            ("IA_AUDIO_FORMATS", "mp3,ogg"),
            ("IA_S3_ACCESS_KEY", "access"),
            ("IA_S3_SECRET_KEY", "secret"),
        ])
        .unwrap();

        assert_eq!(config.max_results, 25);
        assert_eq!(config.download_dir, PathBuf::from("/srv/audio"));
        assert_eq!(config.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.ask_threshold, 3);
        assert_eq!(
            config.formats,
            vec![LogicalAudioFormat::Mp3, LogicalAudioFormat::Ogg]
        );
        assert_eq!(config.api_key().as_deref(), Some("access:secret"));

        let settings = config.pipeline_settings();
        assert_eq!(settings.ask_threshold, 3);
        assert_eq!(settings.download_root, PathBuf::from("/srv/audio"));
    }

    #[test]
    fn test_api_key_requires_both_halves() {
        let config = load(&[("HOME", "/h"), ("IA_S3_ACCESS_KEY", "access")]).unwrap();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = load(&[("HOME", "/h"), ("IA_CONCAT_ASK_THRESH", "many")]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("IA_CONCAT_ASK_THRESH"), "Expected variable in: {msg}");
        assert!(msg.contains("many"), "Expected value in: {msg}");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = load(&[("HOME", "/h"), ("IA_AUDIO_FORMATS", "flac,aiff")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "IA_AUDIO_FORMATS", .. }));
    }

    #[test]
    fn test_missing_home_and_download_dir() {
        assert!(matches!(load(&[]), Err(ConfigError::NoDownloadDir)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = load(&[("HOME", "/h"), ("IA_MAX_RESULTS", "0")]).unwrap();
        assert!(config.validate().is_err());

        config.max_results = 10;
        config.ask_threshold = 0;
        assert!(config.validate().is_err());

        config.ask_threshold = 5;
        config.formats.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = load(&[("HOME", "/h"), ("IA_FFMPEG", "  "), ("IA_MAX_RESULTS", "")]).unwrap();
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.max_results, 10);
    }
}
