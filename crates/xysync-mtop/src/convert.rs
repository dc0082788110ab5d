//! Conversion from protocol models into the flat [`Product`] record.

use xysync_core::Product;

use crate::item::{FeedItem, ItemDetail};

const DETAIL_URL_PREFIX: &str = "https://www.goofish.com/item?id=";
const YES: &str = "是";
const NO: &str = "否";

#[must_use]
pub fn detail_url(item_id: &str) -> String {
    format!("{DETAIL_URL_PREFIX}{item_id}")
}

/// Builds the record for a feed observation captured at `capture_time_ms`.
#[must_use]
pub fn feed_item_to_product(item: &FeedItem, capture_time_ms: i64) -> Product {
    Product {
        item_id: item.item_id.clone(),
        title: item.title.clone(),
        price: item.price.clone(),
        original_price: item.original_price.clone(),
        want_count: item.want_count,
        view_count: item.view_count,
        seller_nick: item.seller_nick.clone(),
        seller_city: item.city.clone(),
        seller_credit: item.seller_credit.clone(),
        free_ship: yes_no(item.free_shipping).to_string(),
        publish_time_ms: item.publish_time.as_ref().map(|t| t.epoch_ms),
        capture_time_ms,
        cover_url: non_empty(&item.image_url),
        detail_url: Some(detail_url(&item.item_id)),
        tags: item.tags.join(", "),
        item_status: item.status.clone(),
        ..Product::default()
    }
}

/// Converts a whole crawl, stamping every record with the same capture time.
#[must_use]
pub fn feed_items_to_products(items: &[FeedItem], capture_time_ms: i64) -> Vec<Product> {
    items
        .iter()
        .map(|item| feed_item_to_product(item, capture_time_ms))
        .collect()
}

/// Overlays detail fields onto a feed-derived record.
///
/// Fields the detail view knows better replace the feed values; empty detail
/// values never erase feed data. Item id, price and want count are left
/// untouched so the record keeps the identity it was deduplicated under.
#[must_use]
pub fn merge_detail(mut product: Product, detail: &ItemDetail) -> Product {
    product.view_count = product.view_count.max(detail.view_count);
    product.collect_count = detail.collect_count;

    overlay(&mut product.title, &detail.title);
    overlay(&mut product.original_price, &detail.original_price);
    overlay(&mut product.condition, &detail.condition);
    overlay(&mut product.seller_nick, &detail.seller.nick);
    overlay(&mut product.seller_city, &detail.seller.city);
    overlay(&mut product.seller_credit, &detail.seller.credit);
    overlay(&mut product.item_status, &detail.item_status_str);
    overlay(&mut product.description, &detail.description);

    product.seller_item_count = detail.seller.item_count;
    product.seller_sold_count = detail.seller.sold_count;
    product.free_ship = yes_no(detail.free_shipping || product.free_ship == YES).to_string();

    if !detail.tags.is_empty() {
        product.tags = detail.tags.join(", ");
    }
    if product.publish_time_ms.is_none() {
        product.publish_time_ms = detail.publish_time.as_ref().map(|t| t.epoch_ms);
    }
    if let Some(video) = non_empty(&detail.video_url) {
        product.video_url = Some(video);
    }
    if let Some(cover) = non_empty(&detail.image_url) {
        product.cover_url = Some(cover);
    }
    product
}

fn overlay(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        YES
    } else {
        NO
    }
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
