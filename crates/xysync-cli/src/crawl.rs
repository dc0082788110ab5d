//! `xysync crawl`: fetch → filter → convert → (pre-dedup) → enrich → sync.
//!
//! Every step runs strictly in sequence. Enrichment failures are collected
//! and reported; the affected records keep their feed-only fields.

use std::fmt;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use xysync_bitable::{period_table_name, BitableClient, SyncEngine};
use xysync_core::{AppConfig, Product, SyncResult};
use xysync_mtop::{
    feed_items_to_products, merge_detail, FeedFilter, FeedOptions, MtopClient,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub(crate) struct CrawlArgs {
    /// Maximum number of feed pages to fetch
    #[arg(long)]
    pub pages: Option<u32>,

    /// First feed page to fetch
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Minimum want-count a listing needs to be kept (0 disables)
    #[arg(long)]
    pub min_want: Option<u32>,

    /// Keep only listings published within this many days (0 disables)
    #[arg(long)]
    pub days: Option<u32>,

    /// Fetch the detail record of every kept listing
    #[arg(long)]
    pub enrich: bool,

    /// Push the records into the period table
    #[arg(long)]
    pub push: bool,

    /// Period to push into, as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print the harvested records as JSON
    #[arg(long)]
    pub print: bool,
}

/// Counters reported at the end of a crawl.
#[derive(Debug, Default)]
pub(crate) struct CrawlSummary {
    pub pages_fetched: u32,
    pub items_seen: usize,
    pub items_kept: usize,
    pub skipped_cards: usize,
    pub enriched: usize,
    pub enrichment_failures: Vec<String>,
    pub pre_skipped: usize,
    pub sync: Option<SyncResult>,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pages fetched:        {}", self.pages_fetched)?;
        writeln!(f, "items fetched:        {}", self.items_seen)?;
        writeln!(f, "items after filter:   {}", self.items_kept)?;
        if self.skipped_cards > 0 {
            writeln!(f, "malformed cards:      {}", self.skipped_cards)?;
        }
        writeln!(f, "enriched:             {}", self.enriched)?;
        if !self.enrichment_failures.is_empty() {
            writeln!(
                f,
                "enrichment failures:  {} ({})",
                self.enrichment_failures.len(),
                self.enrichment_failures.join(", ")
            )?;
        }
        if let Some(sync) = &self.sync {
            writeln!(
                f,
                "skipped duplicates:   {}",
                self.pre_skipped + sync.skipped_duplicates
            )?;
            writeln!(f, "records created:      {}", sync.records_created)?;
            writeln!(f, "table:                {}", sync.table_id)?;
            if !sync.failed_fields.is_empty() {
                writeln!(f, "failed fields:        {}", sync.failed_fields.join(", "))?;
            }
            write!(f, "result:               {}", sync.message)?;
        }
        Ok(())
    }
}

/// Resolves the feed options from configuration, with flags taking
/// precedence.
pub(crate) fn crawl_options(config: &AppConfig, args: &CrawlArgs) -> FeedOptions {
    FeedOptions {
        start_page: args.start_page.unwrap_or(config.start_page),
        max_pages: args.pages.unwrap_or(config.max_pages),
        page_size: config.page_size,
        mach_id: String::new(),
        filter: FeedFilter::new(
            args.min_want.unwrap_or(config.min_want_count),
            args.days.unwrap_or(config.days_within),
        ),
    }
}

pub(crate) async fn run_crawl(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    let client = crate::build_mtop_client(config)?;
    let engine = if args.push {
        let credentials = config.feishu.as_ref().context(
            "--push requires FEISHU_APP_ID, FEISHU_APP_SECRET and FEISHU_APP_TOKEN",
        )?;
        let bitable = BitableClient::from_credentials(credentials, config.request_timeout_secs)?;
        Some(SyncEngine::new(bitable))
    } else {
        None
    };

    let options = crawl_options(config, args);
    let harvest = client
        .fetch_feed(&options)
        .await
        .context("feed crawl failed")?;

    let mut summary = CrawlSummary {
        pages_fetched: harvest.pages_fetched,
        items_seen: harvest.items_seen,
        items_kept: harvest.items.len(),
        skipped_cards: harvest.skipped_cards,
        ..CrawlSummary::default()
    };

    let capture_time_ms = chrono::Utc::now().timestamp_millis();
    let mut products = feed_items_to_products(&harvest.items, capture_time_ms);

    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let table_name = period_table_name(date);

    // Spend detail calls only on observations the table does not have yet.
    if let Some(engine) = &engine {
        let before = products.len();
        products = engine
            .deduplicate_for_table(&table_name, products)
            .await
            .with_context(|| format!("failed to deduplicate against table {table_name}"))?;
        summary.pre_skipped = before - products.len();
    }

    if args.enrich {
        products = enrich(&client, products, config.detail_max_attempts, &mut summary).await;
    }

    if args.print {
        println!("{}", serde_json::to_string_pretty(&products)?);
    }

    if let Some(engine) = &engine {
        let result = engine
            .sync_table(&table_name, products)
            .await
            .with_context(|| format!("failed to sync table {table_name}"))?;
        summary.sync = Some(result);
    }

    println!("{summary}");
    Ok(())
}

/// Fetches details one listing at a time, falling back to the feed record
/// when a fetch fails.
async fn enrich(
    client: &MtopClient,
    products: Vec<Product>,
    max_attempts: u32,
    summary: &mut CrawlSummary,
) -> Vec<Product> {
    let mut enriched = Vec::with_capacity(products.len());
    for product in products {
        match client
            .fetch_detail_with_retry(&product.item_id, max_attempts)
            .await
        {
            Ok(detail) => {
                summary.enriched += 1;
                enriched.push(merge_detail(product, &detail));
            }
            Err(e) => {
                tracing::warn!(item_id = %product.item_id, error = %e, "detail fetch failed, keeping feed record");
                summary.enrichment_failures.push(product.item_id.clone());
                enriched.push(product);
            }
        }
    }
    enriched
}
