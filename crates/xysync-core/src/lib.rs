//! Shared configuration and record types for the xysync workspace.

pub mod app_config;
pub mod config;
pub mod evasion_pools;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, FeishuCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use evasion_pools::{load_evasion_pools, EvasionPools};
pub use products::{DedupKey, Product, SyncResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read evasion pool file {path}: {source}")]
    PoolFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse evasion pool file: {0}")]
    PoolFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
