//! Encoding products as store rows and reading dedup keys back out.

use serde_json::{json, Map, Value};
use xysync_core::{DedupKey, Product};

use crate::schema::{ITEM_ID_FIELD, PRICE_FIELD, WANT_COUNT_FIELD};

/// Encodes `product` as a row with one cell per declared column.
///
/// Text and number columns are always written (empty string / zero when
/// absent); datetime and URL columns are `null` when absent.
#[must_use]
pub fn product_to_fields(product: &Product) -> Map<String, Value> {
    let mut fields = Map::with_capacity(24);
    let mut text = |key: &str, value: &str| {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    };
    text(ITEM_ID_FIELD, &product.item_id);
    text("title", &product.title);
    text("subTitle", &product.sub_title);
    text(PRICE_FIELD, &product.price);
    text("originalPrice", &product.original_price);
    text("condition", &product.condition);
    text("sellerNick", &product.seller_nick);
    text("sellerCity", &product.seller_city);
    text("sellerCredit", &product.seller_credit);
    text("freeShip", &product.free_ship);
    text("tags", &product.tags);
    text("itemStatusStr", &product.item_status);
    text("description", &product.description);

    fields.insert(WANT_COUNT_FIELD.to_string(), json!(product.want_count));
    fields.insert("viewCount".to_string(), json!(product.view_count));
    fields.insert("collectCount".to_string(), json!(product.collect_count));
    fields.insert("exposureHeat".to_string(), json!(product.exposure_heat));
    fields.insert(
        "sellerItemCount".to_string(),
        json!(product.seller_item_count),
    );
    fields.insert(
        "sellerSoldCount".to_string(),
        json!(product.seller_sold_count),
    );

    fields.insert(
        "publishTimeMs".to_string(),
        datetime_cell(product.publish_time_ms),
    );
    fields.insert(
        "captureTimeMs".to_string(),
        datetime_cell(Some(product.capture_time_ms)),
    );

    fields.insert("coverUrl".to_string(), url_cell(product.cover_url.as_deref()));
    fields.insert(
        "detailUrl".to_string(),
        url_cell(product.detail_url.as_deref()),
    );
    fields.insert("videoUrl".to_string(), url_cell(product.video_url.as_deref()));

    fields
}

fn datetime_cell(ms: Option<i64>) -> Value {
    match ms {
        Some(ms) if ms > 0 => json!(ms),
        _ => Value::Null,
    }
}

fn url_cell(url: Option<&str>) -> Value {
    match url {
        Some(url) if !url.is_empty() => json!({ "link": url, "text": url }),
        _ => Value::Null,
    }
}

/// Reads the dedup identity of a stored row.
///
/// Text cells may come back as a plain string or as rich-text segments
/// (`[{"type": "text", "text": ".."}]`). Returns `None` when the row has no
/// item id.
#[must_use]
pub fn dedup_key_from_fields(fields: &Map<String, Value>) -> Option<DedupKey> {
    let item_id = fields.get(ITEM_ID_FIELD).map(text_value)?;
    if item_id.is_empty() {
        return None;
    }
    let price = fields.get(PRICE_FIELD).map(text_value).unwrap_or_default();
    let want_count = fields
        .get(WANT_COUNT_FIELD)
        .and_then(number_value)
        .unwrap_or(0);
    Some(DedupKey {
        item_id,
        price,
        want_count,
    })
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(segments) => segments
            .iter()
            .filter_map(|seg| seg.get("text").and_then(Value::as_str))
            .collect(),
        _ => String::new(),
    }
}

fn number_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let v = f.round() as u64;
                        v
                    })
            })
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
