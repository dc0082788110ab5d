use thiserror::Error;

/// Status-marker fragments the protocol uses when it is shedding load.
const RATE_LIMIT_MARKERS: &[&str] = &["RGV587_ERROR", "被挤爆"];

#[derive(Debug, Error)]
pub enum MtopError {
    /// No usable signing token. Fatal for the whole run.
    #[error("missing session credential: {0}")]
    MissingCredential(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope carried no success marker.
    #[error("{api} rejected the call: {}", ret.join(" | "))]
    Rejected { api: String, ret: Vec<String> },

    /// `body` keeps the raw response text for diagnostics.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cookie header contains characters not allowed in HTTP headers")]
    InvalidCookie,

    #[error("item id must not be empty")]
    EmptyItemId,

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("feed page {page} failed: {source}")]
    Page {
        page: u32,
        #[source]
        source: Box<MtopError>,
    },

    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<MtopError>,
    },
}

impl MtopError {
    /// Returns `true` when the remote rejected the call because it is
    /// throttling or overloaded.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            MtopError::Rejected { ret, .. } => ret
                .iter()
                .any(|marker| RATE_LIMIT_MARKERS.iter().any(|m| marker.contains(m))),
            _ => false,
        }
    }
}
