//! Candidate header values for request fingerprint randomization.
//!
//! The pools are plain data. They ship with built-in defaults and can be
//! replaced from a YAML file so they can be refreshed without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const DEFAULT_ACCEPT_LANGUAGES: &[&str] = &[
    "zh-CN,zh;q=0.9,en;q=0.8",
    "zh-CN,zh;q=0.9",
    "zh-CN,zh;q=0.9,en;q=0.8,ja;q=0.7",
    "en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7",
];

const DEFAULT_REFERERS: &[&str] = &[
    "https://www.goofish.com/",
    "https://www.goofish.com/item/",
    "https://www.taobao.com/",
    "https://h5.m.goofish.com/",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvasionPools {
    pub user_agents: Vec<String>,
    pub accept_languages: Vec<String>,
    pub referers: Vec<String>,
}

impl Default for EvasionPools {
    fn default() -> Self {
        let owned = |values: &[&str]| -> Vec<String> {
            values.iter().map(|v| (*v).to_string()).collect()
        };
        Self {
            user_agents: owned(DEFAULT_USER_AGENTS),
            accept_languages: owned(DEFAULT_ACCEPT_LANGUAGES),
            referers: owned(DEFAULT_REFERERS),
        }
    }
}

/// Load and validate evasion pools from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::PoolFileIo`] if the file cannot be read,
/// [`ConfigError::PoolFileParse`] if the YAML is malformed, and
/// [`ConfigError::Validation`] if any pool is empty or holds a blank entry.
pub fn load_evasion_pools(path: &Path) -> Result<EvasionPools, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PoolFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let pools: EvasionPools = serde_yaml::from_str(&content)?;
    validate_pools(&pools)?;
    Ok(pools)
}

fn validate_pools(pools: &EvasionPools) -> Result<(), ConfigError> {
    for (name, values) in [
        ("user_agents", &pools.user_agents),
        ("accept_languages", &pools.accept_languages),
        ("referers", &pools.referers),
    ] {
        if values.is_empty() {
            return Err(ConfigError::Validation(format!("{name} must not be empty")));
        }
        if values.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{name} must not contain blank entries"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<EvasionPools, ConfigError> {
        let pools: EvasionPools = serde_yaml::from_str(yaml)?;
        validate_pools(&pools)?;
        Ok(pools)
    }

    #[test]
    fn default_pools_are_valid() {
        let pools = EvasionPools::default();
        assert_eq!(pools.user_agents.len(), 13);
        assert_eq!(pools.accept_languages.len(), 4);
        assert_eq!(pools.referers.len(), 4);
        assert!(validate_pools(&pools).is_ok());
    }

    #[test]
    fn parses_valid_yaml() {
        let yaml = r"
user_agents:
  - agent-a
  - agent-b
accept_languages:
  - zh-CN
referers:
  - https://www.goofish.com/
";
        let pools = parse(yaml).unwrap();
        assert_eq!(pools.user_agents, vec!["agent-a", "agent-b"]);
        assert_eq!(pools.accept_languages, vec!["zh-CN"]);
    }

    #[test]
    fn rejects_empty_pool() {
        let yaml = r"
user_agents: []
accept_languages: [zh-CN]
referers: [https://www.goofish.com/]
";
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("user_agents")));
    }

    #[test]
    fn rejects_blank_entry() {
        let yaml = r#"
user_agents: [agent]
accept_languages: ["  "]
referers: [https://www.goofish.com/]
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("accept_languages")));
    }

    #[test]
    fn rejects_missing_section() {
        let yaml = "user_agents: [agent]\n";
        assert!(matches!(parse(yaml), Err(ConfigError::PoolFileParse(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_evasion_pools(Path::new("/nonexistent/evasion.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::PoolFileIo { .. }));
    }

    #[test]
    fn load_shipped_pool_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("evasion.yaml");
        let pools = load_evasion_pools(&path).expect("shipped evasion.yaml should load");
        assert!(!pools.user_agents.is_empty());
    }
}
