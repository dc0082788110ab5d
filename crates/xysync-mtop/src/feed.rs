//! Multi-page feed retrieval with inclusion filtering.

use serde::Serialize;

use crate::client::MtopClient;
use crate::error::MtopError;
use crate::filter::{filter_items, FeedFilter};
use crate::item::FeedItem;
use crate::parse::{parse_page, ParsedPage};

pub const FEED_API: &str = "mtop.taobao.idlehome.home.webpc.feed";

pub const DEFAULT_PAGE_SIZE: u32 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedRequest<'a> {
    item_id: &'a str,
    mach_id: &'a str,
    page_number: u32,
    page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub start_page: u32,
    /// Page budget; the crawl may stop earlier on the last page.
    pub max_pages: u32,
    pub page_size: u32,
    /// Recommendation seed; empty for the generic home feed.
    pub mach_id: String,
    pub filter: FeedFilter,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            max_pages: 10,
            page_size: DEFAULT_PAGE_SIZE,
            mach_id: String::new(),
            filter: FeedFilter::new(0, 14),
        }
    }
}

/// Result of a feed crawl.
#[derive(Debug, Clone, Default)]
pub struct FeedHarvest {
    /// Items that passed the filter, in page order.
    pub items: Vec<FeedItem>,
    pub pages_fetched: u32,
    /// Items parsed before filtering.
    pub items_seen: usize,
    pub skipped_cards: usize,
    /// `true` when the remote reported there is no next page.
    pub reached_end: bool,
}

impl MtopClient {
    /// Fetches and parses one feed page without filtering.
    ///
    /// # Errors
    ///
    /// Any error from [`MtopClient::call`] or [`parse_page`].
    pub async fn fetch_feed_page(
        &self,
        page_number: u32,
        page_size: u32,
        mach_id: &str,
    ) -> Result<ParsedPage, MtopError> {
        let request = FeedRequest {
            item_id: "",
            mach_id,
            page_number,
            page_size,
        };
        let response = self.call(FEED_API, &request).await?;
        parse_page(&response)
    }

    /// Walks feed pages from `options.start_page`, filtering each page and
    /// stopping on the page budget or the first page without a successor.
    ///
    /// Pages are fetched strictly one after another.
    ///
    /// # Errors
    ///
    /// Returns [`MtopError::Page`] carrying the failing page number.
    pub async fn fetch_feed(&self, options: &FeedOptions) -> Result<FeedHarvest, MtopError> {
        let mut harvest = FeedHarvest::default();

        for offset in 0..options.max_pages {
            let page_number = options.start_page.saturating_add(offset);
            let page = self
                .fetch_feed_page(page_number, options.page_size, &options.mach_id)
                .await
                .map_err(|e| MtopError::Page {
                    page: page_number,
                    source: Box::new(e),
                })?;

            harvest.pages_fetched += 1;
            harvest.items_seen += page.items.len();
            harvest.skipped_cards += page.skipped_cards;

            let parsed = page.items.len();
            let kept = filter_items(page.items, &options.filter);
            tracing::info!(
                page = page_number,
                parsed,
                kept = kept.len(),
                has_next_page = page.has_next_page,
                "fetched feed page"
            );
            harvest.items.extend(kept);

            if !page.has_next_page {
                harvest.reached_end = true;
                break;
            }
        }

        Ok(harvest)
    }
}
