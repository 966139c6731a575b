//! HTTP client for the archive's search, metadata and download endpoints.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, READ_TIMEOUT_SECS, SEARCH_FIELDS, SEARCH_FILTER,
};
use super::error::ArchiveError;
use super::types::{MetadataResponse, SearchApiResponse, SearchResponse};
use crate::fetch::{ByteStream, FileSource, TransportError};
use crate::user_agent;

/// Client for one archive endpoint.
///
/// Create once and reuse; the underlying connection pool is shared by
/// clones.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ArchiveClient {
    /// Creates a client for the public archive.
    ///
    /// `api_key` is an `access:secret` pair sent as a `LOW` authorization.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Client`] if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>) -> Result<Self, ArchiveError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a client for a custom endpoint (mirrors, tests).
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::InvalidUrl`] if `base_url` is not an http(s) URL
    /// - [`ArchiveError::Client`] if the HTTP client cannot be built
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self, ArchiveError> {
        let invalid = || ArchiveError::InvalidUrl {
            url: base_url.to_string(),
        };
        let base_url = Url::parse(base_url).map_err(|_| invalid())?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(invalid());
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| ArchiveError::Client { source })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Builds `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of a file within an item. Slashes in `file_name` separate subdirectories.
    #[must_use]
    pub fn download_url(&self, identifier: &str, file_name: &str) -> Url {
        self.endpoint(
            ["download", identifier]
                .into_iter()
                .chain(file_name.split('/')),
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, format!("LOW {key}")),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, ArchiveError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ArchiveError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::http_status(url, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ArchiveError::decode(url, e))
    }

    /// Searches openly licensed audio items.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] if the request fails, the status is not a
    /// success, or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<SearchResponse, ArchiveError> {
        let mut url = self.endpoint(["advancedsearch.php"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &format!("{SEARCH_FILTER} AND {query}"))
                .append_pair("output", "json")
                .append_pair("rows", &max_results.to_string());
            for field in SEARCH_FIELDS {
                pairs.append_pair("fl[]", field);
            }
        }

        let request = self.client.get(url.clone());
        let parsed: SearchApiResponse = self.get_json(request, url.as_str()).await?;
        debug!(hits = parsed.response.docs.len(), "search complete");
        Ok(parsed.response)
    }

    /// Fetches metadata and the file listing of an item.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::ItemNotFound`] when the archive has no such
    /// item, or another [`ArchiveError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn metadata(&self, identifier: &str) -> Result<MetadataResponse, ArchiveError> {
        let url = self.endpoint(["metadata", identifier]);
        let request = self.client.get(url.clone());
        let metadata: MetadataResponse = self.get_json(request, url.as_str()).await?;
        if metadata.is_empty() {
            return Err(ArchiveError::ItemNotFound {
                identifier: identifier.to_string(),
            });
        }
        debug!(files = metadata.files.len(), "metadata fetched");
        Ok(metadata)
    }

    async fn open_download(
        &self,
        identifier: &str,
        file_name: &str,
    ) -> Result<(String, Response), TransportError> {
        let url = self.download_url(identifier, file_name).to_string();
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| TransportError::request(&url, e))?;

        if !response.status().is_success() {
            return Err(TransportError::status(&url, response.status().as_u16()));
        }
        Ok((url, response))
    }
}

#[async_trait]
impl FileSource for ArchiveClient {
    async fn fetch_bytes(
        &self,
        item_id: &str,
        file_name: &str,
    ) -> Result<ByteStream, TransportError> {
        let (url, response) = self.open_download(item_id, file_name).await?;
        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| TransportError::body(url.clone(), e)));
        Ok(stream.boxed())
    }
}
