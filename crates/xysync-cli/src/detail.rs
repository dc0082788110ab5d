//! `xysync detail <ITEM_ID>`: one enriched record as pretty JSON.

use anyhow::Context;
use xysync_core::AppConfig;

pub(crate) async fn run_detail(config: &AppConfig, item_id: &str) -> anyhow::Result<()> {
    let client = crate::build_mtop_client(config)?;
    let detail = client
        .fetch_detail_with_retry(item_id, config.detail_max_attempts)
        .await
        .with_context(|| format!("failed to fetch detail for item {item_id}"))?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}
