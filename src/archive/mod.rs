//! Client for the Internet Archive.
//!
//! Provides search over openly licensed audio, item metadata with file
//! listings, and file downloads. [`ArchiveClient`] implements
//! [`FileSource`](crate::fetch::FileSource), so it plugs straight into the
//! download pipeline.
//!
//! Requests are not retried.

mod client;
pub mod constants;
mod error;
mod types;

pub use client::ArchiveClient;
pub use error::ArchiveError;
pub use types::{
    FileInfo, ItemMetadata, MetadataResponse, OneOrMany, SearchApiResponse, SearchResponse,
    SearchResult,
};
