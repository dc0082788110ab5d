use std::path::PathBuf;

/// Credentials for the destination spreadsheet service.
#[derive(Clone)]
pub struct FeishuCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub app_token: String,
    pub base_url: String,
}

impl std::fmt::Debug for FeishuCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeishuCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[redacted]")
            .field("app_token", &self.app_token)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub cookies: String,
    pub app_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub max_pages: u32,
    pub start_page: u32,
    pub min_want_count: u32,
    pub days_within: u32,
    pub evasion_enabled: bool,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub evasion_pools_path: Option<PathBuf>,
    pub detail_max_attempts: u32,
    pub feishu: Option<FeishuCredentials>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("cookies", &"[redacted]")
            .field("app_key", &self.app_key)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("start_page", &self.start_page)
            .field("min_want_count", &self.min_want_count)
            .field("days_within", &self.days_within)
            .field("evasion_enabled", &self.evasion_enabled)
            .field("delay_min_ms", &self.delay_min_ms)
            .field("delay_max_ms", &self.delay_max_ms)
            .field("evasion_pools_path", &self.evasion_pools_path)
            .field("detail_max_attempts", &self.detail_max_attempts)
            .field("feishu", &self.feishu)
            .finish()
    }
}
