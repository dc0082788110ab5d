use thiserror::Error;

/// Remote code for "a table with this name already exists".
const TABLE_NAME_DUPLICATED: i64 = 1_254_013;

/// Message fragments the store uses for name conflicts. Compared
/// case-insensitively; the wording is undocumented and has changed before.
const DUPLICATE_MARKERS: &[&str] = &["duplicat", "重复"];

/// Errors returned by the destination-store client and sync engine.
#[derive(Debug, Error)]
pub enum BitableError {
    /// Network or TLS failure, timeout, or non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-zero `code`.
    #[error("bitable API error during {context} (code {code}): {msg}")]
    Api {
        context: String,
        code: i64,
        msg: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// Creation reported a name conflict but the table was still not listed
    /// on re-query.
    #[error("table \"{name}\" reported as duplicate but could not be found")]
    TableUnresolved { name: String },
}

impl BitableError {
    /// Returns `true` when the store rejected a create because the name is
    /// already taken.
    #[must_use]
    pub fn is_duplicate_name(&self) -> bool {
        match self {
            BitableError::Api { code, msg, .. } => {
                if *code == TABLE_NAME_DUPLICATED {
                    return true;
                }
                let msg = msg.to_lowercase();
                DUPLICATE_MARKERS.iter().any(|m| msg.contains(m))
            }
            _ => false,
        }
    }
}
