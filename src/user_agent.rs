//! User-Agent string for archive HTTP traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/audiofetch";

/// Default User-Agent for archive requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("audiofetch/{version} (audio-archival-tool; +{PROJECT_UA_URL})")
}
