//! Signed HTTP client for the mtop gateway.

mod headers;

use std::time::Duration;

use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::MtopError;
use crate::evasion::Evasion;
use crate::session::SessionCredential;
use crate::signature::{sign, timestamp_ms};
use crate::types::MtopResponse;

pub const DEFAULT_BASE_URL: &str = "https://h5api.m.goofish.com/h5";

const API_VERSION: &str = "1.0";

/// Fixed protocol query parameters, in the order the web client sends them
/// around the per-call values.
const JSV: &str = "2.7.2";
const RESPONSE_TYPE: &str = "originaljson";
const ACCOUNT_SITE: &str = "xianyu";
const DATA_TYPE: &str = "json";
const REMOTE_TIMEOUT_MS: &str = "20000";
const SESSION_OPTION: &str = "AutoLoginOnly";
const SPM_HOME: &str = "a21ybx.home.0.0";
const SPM_ITEM: &str = "a21ybx.item.0.0";

/// Client for signed mtop calls.
///
/// Owns the session credential for its whole lifetime. When constructed
/// with an [`Evasion`] layer, every call first sleeps for a random pause and
/// sends a randomized browser fingerprint.
pub struct MtopClient {
    client: Client,
    base_url: String,
    app_key: String,
    credential: SessionCredential,
    evasion: Option<Evasion>,
}

impl MtopClient {
    /// Creates a client pointed at the production gateway.
    ///
    /// # Errors
    ///
    /// Returns [`MtopError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credential: SessionCredential,
        app_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, MtopError> {
        Self::with_base_url(credential, app_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MtopError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`MtopError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        credential: SessionCredential,
        app_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MtopError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| MtopError::InvalidBaseUrl {
            base_url: base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            app_key: app_key.to_string(),
            credential,
            evasion: None,
        })
    }

    /// Enables header randomization and request pacing.
    #[must_use]
    pub fn with_evasion(mut self, evasion: Evasion) -> Self {
        self.evasion = Some(evasion);
        self
    }

    #[must_use]
    pub fn credential(&self) -> &SessionCredential {
        &self.credential
    }

    /// Serializes `payload` to JSON and performs a signed call.
    ///
    /// # Errors
    ///
    /// See [`MtopClient::call_raw`]; additionally [`MtopError::Encode`] if the
    /// payload cannot be serialized.
    pub async fn call<T: Serialize + ?Sized>(
        &self,
        api: &str,
        payload: &T,
    ) -> Result<MtopResponse, MtopError> {
        let data = serde_json::to_string(payload).map_err(MtopError::Encode)?;
        self.call_raw(api, &data).await
    }

    /// Performs a signed call with a pre-serialized `data` string.
    ///
    /// # Errors
    ///
    /// - [`MtopError::MissingCredential`] if the session token is empty.
    /// - [`MtopError::Http`] on network failure, timeout, or non-2xx status.
    /// - [`MtopError::Deserialize`] if the envelope is not valid JSON; the raw
    ///   body is attached.
    /// - [`MtopError::Rejected`] if no status marker signals success.
    pub async fn call_raw(&self, api: &str, data: &str) -> Result<MtopResponse, MtopError> {
        let timestamp = timestamp_ms();
        let signature = sign(data, self.credential.token(), &timestamp, &self.app_key)?;
        let url = self.build_url(api, &timestamp, &signature)?;

        let profile = match &self.evasion {
            Some(evasion) => {
                let (pause, profile) = evasion.next_request();
                if !pause.is_zero() {
                    tracing::debug!(api, pause = ?pause, "pacing request");
                    tokio::time::sleep(pause).await;
                }
                Some(profile)
            }
            None => None,
        };

        let mut headers = headers::request_headers(profile.as_ref());
        let cookie = self.credential.cookie_header();
        if !cookie.is_empty() {
            let value = HeaderValue::from_str(&cookie).map_err(|_| MtopError::InvalidCookie)?;
            headers.insert(COOKIE, value);
        }

        let response = self
            .client
            .post(url)
            .headers(headers)
            .form(&[("data", data)])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        let envelope: MtopResponse =
            serde_json::from_str(&body).map_err(|e| MtopError::Deserialize {
                context: format!("{api} envelope"),
                body: body.clone(),
                source: e,
            })?;

        if !envelope.is_success() {
            return Err(MtopError::Rejected {
                api: api.to_string(),
                ret: envelope.ret,
            });
        }

        Ok(envelope)
    }

    /// Builds `{base}/{api}/1.0/` with the signed query string.
    pub(crate) fn build_url(
        &self,
        api: &str,
        timestamp: &str,
        signature: &str,
    ) -> Result<Url, MtopError> {
        let raw = format!("{}/{api}/{API_VERSION}/", self.base_url);
        let mut url = Url::parse(&raw).map_err(|e| MtopError::InvalidBaseUrl {
            base_url: raw.clone(),
            reason: e.to_string(),
        })?;
        let spm_cnt = if api.contains("detail") {
            SPM_ITEM
        } else {
            SPM_HOME
        };
        url.query_pairs_mut()
            .append_pair("jsv", JSV)
            .append_pair("appKey", &self.app_key)
            .append_pair("t", timestamp)
            .append_pair("sign", signature)
            .append_pair("v", API_VERSION)
            .append_pair("type", RESPONSE_TYPE)
            .append_pair("accountSite", ACCOUNT_SITE)
            .append_pair("dataType", DATA_TYPE)
            .append_pair("timeout", REMOTE_TIMEOUT_MS)
            .append_pair("api", api)
            .append_pair("sessionOption", SESSION_OPTION)
            .append_pair("spm_cnt", spm_cnt);
        Ok(url)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
