//! Normalized listing models produced by the feed parser and the detail
//! enricher.

use chrono::{DateTime, Local};
use serde::Serialize;

/// A millisecond epoch timestamp together with its local rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingTime {
    pub epoch_ms: i64,
    pub local: String,
}

impl ListingTime {
    /// Returns `None` for non-positive or out-of-range values.
    #[must_use]
    pub fn from_millis(epoch_ms: i64) -> Option<Self> {
        if epoch_ms <= 0 {
            return None;
        }
        let utc = DateTime::from_timestamp_millis(epoch_ms)?;
        Some(Self {
            epoch_ms,
            local: utc
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        })
    }
}

/// One listing as it appears in a feed page.
///
/// `item_id` is always non-empty; cards without one never become a
/// `FeedItem`. The same id may appear more than once in a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub item_id: String,
    pub title: String,
    /// Opaque currency string as sent upstream.
    pub price: String,
    pub original_price: String,
    pub image_url: String,
    pub images: Vec<String>,
    pub is_video: bool,
    pub seller_nick: String,
    pub city: String,
    pub seller_credit: String,
    pub shop_level: String,
    pub free_shipping: bool,
    pub want_count: u32,
    pub view_count: u64,
    pub category_id: i64,
    pub status: String,
    pub redirect_url: String,
    pub publish_time: Option<ListingTime>,
    pub modified_time: Option<ListingTime>,
    pub polish_time: Option<ListingTime>,
    pub tags: Vec<String>,
}

impl FeedItem {
    /// Publish time in epoch milliseconds, `0` when unknown.
    #[must_use]
    pub fn publish_time_ms(&self) -> i64 {
        self.publish_time.as_ref().map_or(0, |t| t.epoch_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    pub url: String,
    pub major: bool,
    pub width: u64,
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuProperty {
    pub property_id: String,
    pub property_text: String,
    pub value_id: String,
    pub value_text: String,
    pub actual_value_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    pub sku_id: String,
    pub inventory_id: String,
    pub price_in_cent: u64,
    pub quantity: u64,
    pub properties: Vec<SkuProperty>,
}

/// Category property such as condition (`成色`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpvLabel {
    pub property_id: String,
    pub property_name: String,
    pub value_id: String,
    pub value_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub seller_id: String,
    pub nick: String,
    pub city: String,
    pub avatar_url: String,
    pub signature: String,
    pub item_count: u64,
    pub sold_count: u64,
    pub registration_days: u64,
    pub credit: String,
    pub shop_level: String,
}

/// Full single-listing record from the detail API. Request-scoped: fetched,
/// merged into a [`xysync_core::Product`], then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub price: String,
    pub original_price: String,
    pub price_in_cent: u64,
    pub item_status: i64,
    pub item_status_str: String,
    pub want_count: u32,
    pub view_count: u64,
    pub collect_count: u64,
    pub quantity: u64,
    pub publish_time: Option<ListingTime>,
    pub image_url: String,
    pub images: Vec<ItemImage>,
    pub video_url: String,
    pub skus: Vec<Sku>,
    pub cpv_labels: Vec<CpvLabel>,
    pub condition: String,
    pub is_new: bool,
    pub free_shipping: bool,
    pub transport_fee: String,
    pub tags: Vec<String>,
    pub seller: SellerProfile,
}
