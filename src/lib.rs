//! Audiofetch Core Library
//!
//! Retrieves audio from the Internet Archive, prefers the configured
//! encodings, skips files whose local copy already matches the published
//! MD5, and reassembles files the archive split into numbered parts.
//!
//! # Architecture
//!
//! - [`format`] - Logical audio formats and label matching
//! - [`integrity`] - MD5 skip-if-present checks
//! - [`fetch`] - Streaming a remote file to disk through a [`FileSource`]
//! - [`multipart`] - Grouping numbered parts into [`PartSet`]s
//! - [`concat`] - Driving the external merge tool (ffmpeg)
//! - [`pipeline`] - Fetch, detect and merge for one item
//! - [`archive`] - Search, metadata and download endpoints
//! - [`config`] - Environment configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod concat;
pub mod config;
pub mod fetch;
pub mod format;
pub mod integrity;
pub mod multipart;
pub mod pipeline;
mod user_agent;

// Re-export commonly used types
pub use archive::{ArchiveClient, ArchiveError, MetadataResponse, SearchResponse};
pub use concat::{CodecMode, ConcatError, Ffmpeg, MergeTool};
pub use config::{Config, ConfigError};
pub use fetch::{DownloadOutcome, FetchError, Fetcher, FileSource, RemoteFileDescriptor, TransportError};
pub use format::LogicalAudioFormat;
pub use multipart::PartSet;
pub use pipeline::{
    DownloadReport, MergeDecision, MergeInstruction, MergeResult, Pipeline, PipelineError,
    PipelineSettings,
};
