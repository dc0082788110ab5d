mod crawl;
mod detail;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xysync_core::{load_evasion_pools, AppConfig, EvasionPools};
use xysync_mtop::{DelayManager, Evasion, MtopClient, SessionCredential};

use crate::crawl::CrawlArgs;

#[derive(Debug, Parser)]
#[command(name = "xysync")]
#[command(about = "Harvest marketplace feed listings and sync them into bitable period tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl feed pages, filter, optionally enrich and push
    Crawl(CrawlArgs),
    /// Fetch and print the full record of one listing
    Detail {
        /// Listing id
        item_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = xysync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Crawl(args) => crawl::run_crawl(&config, &args).await,
        Commands::Detail { item_id } => detail::run_detail(&config, &item_id).await,
    }
}

/// Builds the signed protocol client from configuration, attaching the
/// evasion layer when enabled.
pub(crate) fn build_mtop_client(config: &AppConfig) -> anyhow::Result<MtopClient> {
    let credential = SessionCredential::from_cookie_header(&config.cookies)
        .context("XYSYNC_COOKIES does not carry a usable session token")?;
    let client = MtopClient::with_base_url(
        credential,
        &config.app_key,
        config.request_timeout_secs,
        &config.base_url,
    )?;

    if !config.evasion_enabled {
        return Ok(client);
    }
    let pools = match &config.evasion_pools_path {
        Some(path) => load_evasion_pools(path)?,
        None => EvasionPools::default(),
    };
    let delay = DelayManager::new(config.delay_min_ms, config.delay_max_ms);
    Ok(client.with_evasion(Evasion::new(pools, delay)))
}
