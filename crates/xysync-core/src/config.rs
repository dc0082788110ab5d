use std::path::PathBuf;

use crate::app_config::{AppConfig, FeishuCredentials};
use crate::ConfigError;

const DEFAULT_APP_KEY: &str = "34839810";
const DEFAULT_BASE_URL: &str = "https://h5api.m.goofish.com/h5";
const DEFAULT_FEISHU_BASE_URL: &str = "https://open.feishu.cn";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_flag = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        parse_bool(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{raw}'"),
        })
    };

    let cookies = require("XYSYNC_COOKIES")?;
    let log_level = or_default("XYSYNC_LOG_LEVEL", "info");
    let app_key = or_default("XYSYNC_APP_KEY", DEFAULT_APP_KEY);
    let base_url = or_default("XYSYNC_BASE_URL", DEFAULT_BASE_URL);

    let request_timeout_secs = parse_u64("XYSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let page_size = parse_u32("XYSYNC_PAGE_SIZE", "30")?;
    let max_pages = parse_u32("XYSYNC_MAX_PAGES", "10")?;
    let start_page = parse_u32("XYSYNC_START_PAGE", "1")?;
    let min_want_count = parse_u32("XYSYNC_MIN_WANT", "1")?;
    let days_within = parse_u32("XYSYNC_DAYS_WITHIN", "14")?;

    let evasion_enabled = parse_flag("XYSYNC_EVASION_ENABLED", "true")?;
    let delay_min_ms = parse_u64("XYSYNC_DELAY_MIN_MS", "1000")?;
    let delay_max_ms = parse_u64("XYSYNC_DELAY_MAX_MS", "3000")?;
    if delay_min_ms > delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "XYSYNC_DELAY_MIN_MS ({delay_min_ms}) must not exceed XYSYNC_DELAY_MAX_MS ({delay_max_ms})"
        )));
    }
    let evasion_pools_path = lookup("XYSYNC_EVASION_POOLS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let detail_max_attempts = parse_u32("XYSYNC_DETAIL_MAX_ATTEMPTS", "3")?;
    if detail_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "XYSYNC_DETAIL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let feishu = build_feishu_credentials(&lookup, &require)?;

    Ok(AppConfig {
        log_level,
        cookies,
        app_key,
        base_url,
        request_timeout_secs,
        page_size,
        max_pages,
        start_page,
        min_want_count,
        days_within,
        evasion_enabled,
        delay_min_ms,
        delay_max_ms,
        evasion_pools_path,
        detail_max_attempts,
        feishu,
    })
}

/// Destination credentials are optional as a group: absent entirely means
/// pushing is disabled, but a partial set is a configuration mistake.
fn build_feishu_credentials<F, R>(
    lookup: &F,
    require: &R,
) -> Result<Option<FeishuCredentials>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    R: Fn(&str) -> Result<String, ConfigError>,
{
    const VARS: [&str; 3] = ["FEISHU_APP_ID", "FEISHU_APP_SECRET", "FEISHU_APP_TOKEN"];

    if VARS.iter().all(|var| lookup(var).is_err()) {
        return Ok(None);
    }

    Ok(Some(FeishuCredentials {
        app_id: require(VARS[0])?,
        app_secret: require(VARS[1])?,
        app_token: require(VARS[2])?,
        base_url: lookup("FEISHU_BASE_URL").unwrap_or_else(|_| DEFAULT_FEISHU_BASE_URL.to_string()),
    }))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
