//! Request signing for the mtop protocol.
//!
//! The digest is the lowercase hex MD5 of `token&timestamp&appKey&payload`.

use md5::{Digest, Md5};

use crate::error::MtopError;

/// App key used by the web client.
pub const DEFAULT_APP_KEY: &str = "34839810";

/// A computed signature together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub sign: String,
    pub timestamp: String,
    pub app_key: String,
    /// The exact string that was hashed.
    pub sign_string: String,
}

/// Computes the signature for one call.
///
/// # Errors
///
/// Returns [`MtopError::MissingCredential`] if `token` is empty.
pub fn sign(
    payload: &str,
    token: &str,
    timestamp_ms: &str,
    app_key: &str,
) -> Result<String, MtopError> {
    sign_payload(payload, token, timestamp_ms, app_key).map(|signed| signed.sign)
}

/// Like [`sign`], but keeps the signed string and inputs for diagnostics.
///
/// # Errors
///
/// Returns [`MtopError::MissingCredential`] if `token` is empty.
pub fn sign_payload(
    payload: &str,
    token: &str,
    timestamp_ms: &str,
    app_key: &str,
) -> Result<SignedPayload, MtopError> {
    if token.is_empty() {
        return Err(MtopError::MissingCredential(
            "signing token is empty".to_string(),
        ));
    }

    let sign_string = format!("{token}&{timestamp_ms}&{app_key}&{payload}");
    let digest = Md5::digest(sign_string.as_bytes());

    Ok(SignedPayload {
        sign: hex::encode(digest),
        timestamp: timestamp_ms.to_string(),
        app_key: app_key.to_string(),
        sign_string,
    })
}

/// Current wall-clock time as a 13-digit millisecond string.
#[must_use]
pub fn timestamp_ms() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"itemId":"123"}"#;

    #[test]
    fn matches_known_vector() {
        let sign = sign(PAYLOAD, "abc123", "1700000000000", DEFAULT_APP_KEY).unwrap();
        assert_eq!(sign, "1b74451f72055fdb627738972b346c16");
    }

    #[test]
    fn matches_second_known_vector() {
        let sign = sign("{}", "tok", "1", DEFAULT_APP_KEY).unwrap();
        assert_eq!(sign, "337b2e3fcc5f9162ae4f10b2a9c25559");
    }

    #[test]
    fn is_deterministic() {
        let a = sign(PAYLOAD, "abc123", "1700000000000", DEFAULT_APP_KEY).unwrap();
        let b = sign(PAYLOAD, "abc123", "1700000000000", DEFAULT_APP_KEY).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn any_input_change_changes_digest() {
        let base = sign(PAYLOAD, "abc123", "1700000000000", DEFAULT_APP_KEY).unwrap();
        let variants = [
            sign(r#"{"itemId":"124"}"#, "abc123", "1700000000000", DEFAULT_APP_KEY),
            sign(PAYLOAD, "abc124", "1700000000000", DEFAULT_APP_KEY),
            sign(PAYLOAD, "abc123", "1700000000001", DEFAULT_APP_KEY),
            sign(PAYLOAD, "abc123", "1700000000000", "12574478"),
        ];
        for variant in variants {
            assert_ne!(variant.unwrap(), base);
        }
    }

    #[test]
    fn empty_token_is_credential_error_for_every_payload() {
        for payload in ["", "{}", PAYLOAD, "plain text"] {
            let err = sign(payload, "", "1700000000000", DEFAULT_APP_KEY).unwrap_err();
            assert!(matches!(err, MtopError::MissingCredential(_)), "{err:?}");
        }
    }

    #[test]
    fn sign_payload_exposes_signed_string() {
        let signed = sign_payload("{}", "tok", "1", DEFAULT_APP_KEY).unwrap();
        assert_eq!(signed.sign_string, "tok&1&34839810&{}");
        assert_eq!(signed.timestamp, "1");
        assert_eq!(signed.app_key, DEFAULT_APP_KEY);
    }

    #[test]
    fn timestamp_is_thirteen_digits() {
        let ts = timestamp_ms();
        assert_eq!(ts.len(), 13);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }
}
