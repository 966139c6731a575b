//! Constants for the archive client (endpoints, timeouts).

/// Public Internet Archive endpoint.
pub const DEFAULT_BASE_URL: &str = "https://archive.org";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large audio files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Search filter restricting results to openly licensed audio.
pub const SEARCH_FILTER: &str =
    "mediatype:audio AND (licenseurl:*creative* OR licenseurl:*publicdomain*)";

/// Fields requested from the search endpoint.
pub const SEARCH_FIELDS: [&str; 6] = [
    "identifier",
    "title",
    "creator",
    "date",
    "description",
    "licenseurl",
];
