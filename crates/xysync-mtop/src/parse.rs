//! Feed page decoding: envelope payload → ordered [`FeedItem`]s.

use serde_json::Value;

use crate::error::MtopError;
use crate::item::{FeedItem, ListingTime};
use crate::tags::{classify_tags, parse_want_count, TagInput};
use crate::types::{lenient, FeedPageData, MtopResponse, RawCard, RawCardData};

/// One decoded feed page.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub items: Vec<FeedItem>,
    pub has_next_page: bool,
    /// Cards that failed to decode or had no item id.
    pub skipped_cards: usize,
}

/// Decodes the payload of a feed envelope.
///
/// Individual cards that fail to decode or lack an item id are logged and
/// skipped. Duplicate item ids within the page are kept.
///
/// # Errors
///
/// Returns [`MtopError::Deserialize`] if the page-level structure itself does
/// not decode.
pub fn parse_page(response: &MtopResponse) -> Result<ParsedPage, MtopError> {
    let page: FeedPageData =
        serde_json::from_value(response.data.clone()).map_err(|e| MtopError::Deserialize {
            context: "feed page data".to_string(),
            body: response.data.to_string(),
            source: e,
        })?;

    let mut parsed = ParsedPage {
        items: Vec::with_capacity(page.card_list.len()),
        has_next_page: page.next_page,
        skipped_cards: 0,
    };

    for (index, card) in page.card_list.into_iter().enumerate() {
        match parse_card(card) {
            Ok(Some(item)) => parsed.items.push(item),
            Ok(None) => {
                tracing::warn!(card_index = index, "skipping card without item id");
                parsed.skipped_cards += 1;
            }
            Err(e) => {
                tracing::warn!(card_index = index, error = %e, "skipping undecodable card");
                parsed.skipped_cards += 1;
            }
        }
    }

    Ok(parsed)
}

/// Decodes a single card. `Ok(None)` means the card has no item id.
///
/// # Errors
///
/// Returns the underlying decode error when the card shape is unusable.
pub fn parse_card(card: Value) -> Result<Option<FeedItem>, serde_json::Error> {
    let raw: RawCard = serde_json::from_value(card)?;
    let data = raw.card_data;

    let item_id = data.detail_params.item_id.trim().to_string();
    if item_id.is_empty() {
        return Ok(None);
    }

    let findings = classify_tags(data.fish_tags.values().flat_map(|region| {
        region.tag_list.iter().map(|tag| TagInput {
            content: tag.data.content.as_str(),
            tracking: tag
                .ut_params
                .as_ref()
                .and_then(|p| p.args.as_ref())
                .map(|args| args.content.as_str()),
        })
    }));

    let want_count = findings
        .want_count
        .filter(|n| *n > 0)
        .or_else(|| parse_want_count(&data.hot_point.text))
        .unwrap_or(0);

    let attribute_time = |key: &str| {
        data.attribute_map
            .get(key)
            .map(lenient::to_i64)
            .and_then(ListingTime::from_millis)
    };
    let free_shipping_attr = data
        .attribute_map
        .get("freeShipping")
        .is_some_and(lenient::to_bool);

    let price = first_non_empty(&data.price_info.price, &data.detail_params.sold_price);
    let seller_nick = first_non_empty(&data.user.user_nick, &data.detail_params.user_nick);
    let (publish_time, modified_time, polish_time) = (
        attribute_time("gmtShelf"),
        attribute_time("gmtModified"),
        attribute_time("proPolishTime"),
    );
    let images = card_images(&data);

    Ok(Some(FeedItem {
        item_id,
        title: data.detail_params.title,
        price,
        original_price: data.price_info.ori_price,
        image_url: data.detail_params.pic_url,
        images,
        is_video: data.detail_params.is_video,
        seller_nick,
        city: data.city,
        seller_credit: findings.seller_credit.unwrap_or_default(),
        shop_level: findings.shop_level.unwrap_or_default(),
        free_shipping: free_shipping_attr || findings.free_shipping,
        want_count,
        view_count: data.view_count,
        category_id: data.category_id,
        status: data.status,
        redirect_url: data.redirect_url,
        publish_time,
        modified_time,
        polish_time,
        tags: findings.tags,
    }))
}

fn card_images(data: &RawCardData) -> Vec<String> {
    data.images
        .iter()
        .map(|img| img.url.clone())
        .filter(|url| !url.is_empty())
        .collect()
}

fn first_non_empty(primary: &str, fallback: &str) -> String {
    if primary.is_empty() {
        fallback.to_string()
    } else {
        primary.to_string()
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
