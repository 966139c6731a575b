//! Response types for the archive's search and metadata endpoints.
//!
//! Only the fields the tool uses are typed; everything else is ignored.
//! Several text fields are a string on some items and a list on others.

use serde::{Deserialize, Serialize};

use crate::fetch::RemoteFileDescriptor;

/// A field the archive returns as either one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Joins list values with `"; "`.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::One(value) => value.clone(),
            Self::Many(values) => values.join("; "),
        }
    }
}

/// Envelope of the advanced-search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchApiResponse {
    pub response: SearchResponse,
}

/// Search hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub docs: Vec<SearchResult>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenseurl: Option<String>,
}

/// Item metadata and file listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_size: Option<u64>,
    #[serde(default)]
    pub files: Vec<FileInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ItemMetadata>,
}

impl MetadataResponse {
    /// True for the empty object the archive returns for unknown items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none() && self.files.is_empty()
    }

    /// File descriptors for the download pipeline, in listing order.
    #[must_use]
    pub fn remote_files(&self) -> Vec<RemoteFileDescriptor> {
        self.files
            .iter()
            .map(|file| {
                RemoteFileDescriptor::new(&file.name, &file.format, file.md5.clone())
            })
            .collect()
    }
}

/// One file of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

/// Descriptive metadata of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenseurl: Option<String>,
}
