//! HTTP client for the destination store's open API.
//!
//! Authenticates with an app-credential exchange and caches the resulting
//! tenant token until shortly before it expires. Every business endpoint
//! returns a `{code, msg, data}` envelope; non-zero codes surface as
//! [`BitableError::Api`].

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use xysync_core::FeishuCredentials;

use crate::error::BitableError;
use crate::schema::FieldCreate;
use crate::types::{
    BatchCreateData, CreateFieldData, CreateTableData, Envelope, FieldInfo, NewRecord, Page,
    RecordInfo, SearchCondition, SearchFilter, SearchRequest, TableInfo, TenantTokenResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";

/// Maximum rows accepted by one batch-create request.
pub const BATCH_CREATE_LIMIT: usize = 500;

const TOKEN_PATH: &str = "open-apis/auth/v3/tenant_access_token/internal";
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);
const LIST_PAGE_SIZE: &str = "100";
const SEARCH_PAGE_SIZE: &str = "500";

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Client scoped to one app (`app_token`) of the store.
pub struct BitableClient {
    client: Client,
    base_url: Url,
    app_id: String,
    app_secret: String,
    app_token: String,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for BitableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitableClient")
            .field("base_url", &self.base_url.as_str())
            .field("app_id", &self.app_id)
            .field("app_secret", &"[redacted]")
            .field("app_token", &self.app_token)
            .finish_non_exhaustive()
    }
}

impl BitableClient {
    /// Creates a client pointed at the production store.
    ///
    /// # Errors
    ///
    /// Returns [`BitableError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        app_id: &str,
        app_secret: &str,
        app_token: &str,
        timeout_secs: u64,
    ) -> Result<Self, BitableError> {
        Self::with_base_url(app_id, app_secret, app_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client from loaded configuration, honouring its base URL.
    ///
    /// # Errors
    ///
    /// See [`BitableClient::with_base_url`].
    pub fn from_credentials(
        credentials: &FeishuCredentials,
        timeout_secs: u64,
    ) -> Result<Self, BitableError> {
        Self::with_base_url(
            &credentials.app_id,
            &credentials.app_secret,
            &credentials.app_token,
            timeout_secs,
            &credentials.base_url,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`BitableError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`BitableError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        app_id: &str,
        app_secret: &str,
        app_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, BitableError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // A trailing slash makes `Url::join` append rather than replace the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| BitableError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            app_token: app_token.to_string(),
            token: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn app_token(&self) -> &str {
        &self.app_token
    }

    /// Returns a valid tenant token, exchanging credentials when the cached
    /// one is missing or within five minutes of expiry.
    ///
    /// # Errors
    ///
    /// - [`BitableError::Http`] on network failure.
    /// - [`BitableError::Api`] if the exchange is refused.
    /// - [`BitableError::Deserialize`] if the response does not decode.
    pub async fn tenant_access_token(&self) -> Result<String, BitableError> {
        {
            let cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(token) = cached.as_ref() {
                if Instant::now() < token.expires_at {
                    return Ok(token.value.clone());
                }
            }
        }

        let url = self.url(TOKEN_PATH)?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "app_id": self.app_id, "app_secret": self.app_secret }))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let parsed: TenantTokenResponse =
            serde_json::from_str(&body).map_err(|e| BitableError::Deserialize {
                context: "tenant access token".to_string(),
                source: e,
            })?;
        if parsed.code != 0 {
            return Err(BitableError::Api {
                context: "tenant access token".to_string(),
                code: parsed.code,
                msg: parsed.msg,
            });
        }

        let lifetime = Duration::from_secs(parsed.expire).saturating_sub(TOKEN_REFRESH_MARGIN);
        tracing::debug!(expires_in = ?lifetime, "obtained tenant access token");
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(CachedToken {
            value: parsed.tenant_access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(parsed.tenant_access_token)
    }

    /// Lists every table in the app.
    ///
    /// # Errors
    ///
    /// Any transport, API, or decode error.
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>, BitableError> {
        let url = self.url(&format!("open-apis/bitable/v1/apps/{}/tables", self.app_token))?;
        self.collect_pages("list tables", |page_token| {
            Self::with_page(self.client.get(url.clone()), LIST_PAGE_SIZE, page_token)
        })
        .await
    }

    /// Looks up a table by exact name.
    ///
    /// # Errors
    ///
    /// See [`BitableClient::list_tables`].
    pub async fn find_table(&self, name: &str) -> Result<Option<TableInfo>, BitableError> {
        Ok(self
            .list_tables()
            .await?
            .into_iter()
            .find(|table| table.name == name))
    }

    /// Creates a table with `fields` pre-declared.
    ///
    /// # Errors
    ///
    /// [`BitableError::Api`] on rejection, including name conflicts (see
    /// [`BitableError::is_duplicate_name`]).
    pub async fn create_table(
        &self,
        name: &str,
        fields: &[FieldCreate],
    ) -> Result<TableInfo, BitableError> {
        let url = self.url(&format!("open-apis/bitable/v1/apps/{}/tables", self.app_token))?;
        let body = json!({ "table": { "name": name, "fields": fields } });
        let context = format!("create table {name}");
        let data: CreateTableData = self
            .execute(self.client.post(url).json(&body), &context)
            .await?;

        let table_id = data
            .table_id
            .or_else(|| data.table.map(|t| t.table_id))
            .ok_or_else(|| missing_data(&context))?;
        Ok(TableInfo {
            table_id,
            name: name.to_string(),
        })
    }

    /// Lists the columns of a table.
    ///
    /// # Errors
    ///
    /// Any transport, API, or decode error.
    pub async fn list_fields(&self, table_id: &str) -> Result<Vec<FieldInfo>, BitableError> {
        let url = self.table_url(table_id, "fields")?;
        let context = format!("list fields of {table_id}");
        self.collect_pages(&context, |page_token| {
            Self::with_page(self.client.get(url.clone()), LIST_PAGE_SIZE, page_token)
        })
        .await
    }

    /// Adds one column to a table.
    ///
    /// # Errors
    ///
    /// Any transport, API, or decode error.
    pub async fn create_field(
        &self,
        table_id: &str,
        field: &FieldCreate,
    ) -> Result<FieldInfo, BitableError> {
        let url = self.table_url(table_id, "fields")?;
        let context = format!("create field {}", field.field_name);
        let data: CreateFieldData = self
            .execute(self.client.post(url).json(field), &context)
            .await?;
        Ok(data.field)
    }

    /// Returns every row whose `field_name` cell equals `value`.
    ///
    /// # Errors
    ///
    /// Any transport, API, or decode error.
    pub async fn search_records(
        &self,
        table_id: &str,
        field_name: &str,
        value: &str,
    ) -> Result<Vec<RecordInfo>, BitableError> {
        let url = self.table_url(table_id, "records/search")?;
        let body = SearchRequest {
            filter: SearchFilter {
                conjunction: "and",
                conditions: vec![SearchCondition {
                    field_name,
                    operator: "is",
                    value: vec![value],
                }],
            },
            automatic_fields: false,
        };
        let context = format!("search {table_id} where {field_name} = {value}");
        self.collect_pages(&context, |page_token| {
            Self::with_page(
                self.client.post(url.clone()).json(&body),
                SEARCH_PAGE_SIZE,
                page_token,
            )
        })
        .await
    }

    /// Creates one row per entry of `rows`, in chunks of
    /// [`BATCH_CREATE_LIMIT`]. Returns the number of rows created.
    ///
    /// An empty `rows` makes no request.
    ///
    /// # Errors
    ///
    /// Any transport, API, or decode error. Chunks already written before a
    /// failing chunk stay written.
    pub async fn batch_create_records(
        &self,
        table_id: &str,
        rows: Vec<Map<String, Value>>,
    ) -> Result<usize, BitableError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let url = self.table_url(table_id, "records/batch_create")?;
        let mut created = 0;
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<NewRecord> = rows
                .by_ref()
                .take(BATCH_CREATE_LIMIT)
                .map(|fields| NewRecord { fields })
                .collect();
            let context = format!("batch create {} rows in {table_id}", chunk.len());
            let data: BatchCreateData = self
                .execute(
                    self.client
                        .post(url.clone())
                        .json(&json!({ "records": chunk })),
                    &context,
                )
                .await?;
            created += data.records.len();
        }
        Ok(created)
    }

    fn url(&self, path: &str) -> Result<Url, BitableError> {
        self.base_url
            .join(path)
            .map_err(|e| BitableError::InvalidBaseUrl {
                base_url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    fn table_url(&self, table_id: &str, suffix: &str) -> Result<Url, BitableError> {
        self.url(&format!(
            "open-apis/bitable/v1/apps/{}/tables/{table_id}/{suffix}",
            self.app_token
        ))
    }

    fn with_page(
        request: RequestBuilder,
        page_size: &str,
        page_token: Option<&str>,
    ) -> RequestBuilder {
        let request = request.query(&[("page_size", page_size)]);
        match page_token {
            Some(token) => request.query(&[("page_token", token)]),
            None => request,
        }
    }

    /// Follows `page_token` until the store reports no more pages.
    async fn collect_pages<T, F>(
        &self,
        context: &str,
        mut request_for: F,
    ) -> Result<Vec<T>, BitableError>
    where
        T: DeserializeOwned,
        F: FnMut(Option<&str>) -> RequestBuilder,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page: Page<T> = self
                .execute(request_for(page_token.as_deref()), context)
                .await?;
            items.extend(page.items);
            match page.page_token.filter(|t| !t.is_empty()) {
                Some(next) if page.has_more && page_token.as_deref() != Some(next.as_str()) => {
                    page_token = Some(next);
                }
                _ => break,
            }
        }
        Ok(items)
    }

    /// Sends an authenticated request and unwraps the `{code, msg, data}`
    /// envelope.
    ///
    /// Error statuses with a decodable envelope are reported as
    /// [`BitableError::Api`] so the remote code and message survive.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, BitableError> {
        let token = self.tenant_access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status_error = response.error_for_status_ref().err();
        let body = response.text().await?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Err(match status_error {
                    Some(status) => BitableError::Http(status),
                    None => BitableError::Deserialize {
                        context: context.to_string(),
                        source: e,
                    },
                })
            }
        };

        if envelope.code != 0 {
            return Err(BitableError::Api {
                context: context.to_string(),
                code: envelope.code,
                msg: envelope.msg,
            });
        }
        if let Some(status) = status_error {
            return Err(BitableError::Http(status));
        }
        envelope.data.ok_or_else(|| missing_data(context))
    }
}

fn missing_data(context: &str) -> BitableError {
    BitableError::Deserialize {
        context: context.to_string(),
        source: <serde_json::Error as serde::de::Error>::custom("response has no data"),
    }
}
