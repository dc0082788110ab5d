//! Wire types for mtop responses.
//!
//! Card and detail payloads are loosely typed upstream: the same field may
//! arrive as a string, a number, or be missing. The `lenient` helpers absorb
//! that so a single odd field never drops an otherwise usable record.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

/// Decoded envelope of every mtop call.
#[derive(Debug, Clone, Deserialize)]
pub struct MtopResponse {
    #[serde(default)]
    pub ret: Vec<String>,
    #[serde(default)]
    pub v: String,
    #[serde(default)]
    pub data: Value,
}

impl MtopResponse {
    /// `true` when any status marker is a success sentinel.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.ret
            .iter()
            .any(|marker| marker == "SUCCESS::调用成功" || marker.starts_with("SUCCESS"))
    }
}

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(crate) fn to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_i64(value: &Value) -> i64 {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub(crate) fn to_u64(value: &Value) -> u64 {
        u64::try_from(to_i64(value)).unwrap_or(0)
    }

    pub(crate) fn to_bool(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64() == Some(1),
            Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(to_string(&Value::deserialize(d)?))
    }

    pub(crate) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(to_i64(&Value::deserialize(d)?))
    }

    pub(crate) fn uint<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(to_u64(&Value::deserialize(d)?))
    }

    /// Treats an explicit `null` like a missing key.
    pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Option::<T>::deserialize(d).map(Option::unwrap_or_default)
    }

    pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(to_bool(&Value::deserialize(d)?))
    }
}

// ---------------------------------------------------------------------------
// Feed page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedPageData {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub card_list: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub next_page: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCard {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub card_data: RawCardData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawCardData {
    #[serde(deserialize_with = "lenient::int")]
    pub category_id: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(deserialize_with = "lenient::uint")]
    pub view_count: u64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub detail_params: RawDetailParams,
    #[serde(deserialize_with = "lenient::or_default")]
    pub user: RawUser,
    #[serde(deserialize_with = "lenient::or_default")]
    pub price_info: RawPriceInfo,
    #[serde(deserialize_with = "lenient::or_default")]
    pub hot_point: RawHotPoint,
    #[serde(deserialize_with = "lenient::or_default")]
    pub images: Vec<RawImage>,
    #[serde(deserialize_with = "lenient::string")]
    pub redirect_url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub attribute_map: HashMap<String, Value>,
    /// Ordered by region name so tag classification is reproducible.
    #[serde(deserialize_with = "lenient::or_default")]
    pub fish_tags: BTreeMap<String, RawTagRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawDetailParams {
    #[serde(deserialize_with = "lenient::string")]
    pub item_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub pic_url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub user_nick: String,
    #[serde(deserialize_with = "lenient::string")]
    pub sold_price: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_video: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawUser {
    #[serde(deserialize_with = "lenient::string")]
    pub user_nick: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawPriceInfo {
    #[serde(deserialize_with = "lenient::string")]
    pub price: String,
    #[serde(deserialize_with = "lenient::string")]
    pub ori_price: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawHotPoint {
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawImage {
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTagRegion {
    #[serde(deserialize_with = "lenient::or_default")]
    pub tag_list: Vec<RawTag>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTag {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: RawTagData,
    pub ut_params: Option<RawUtParams>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTagData {
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawUtParams {
    pub args: Option<RawTagData>,
}

// ---------------------------------------------------------------------------
// Item detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawDetailData {
    #[serde(rename = "itemDO", deserialize_with = "lenient::or_default")]
    pub item_do: RawItemDo,
    #[serde(rename = "sellerDO", deserialize_with = "lenient::or_default")]
    pub seller_do: RawSellerDo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawItemDo {
    #[serde(deserialize_with = "lenient::string")]
    pub item_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub desc: String,
    #[serde(deserialize_with = "lenient::int")]
    pub category_id: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub sold_price: String,
    #[serde(deserialize_with = "lenient::string")]
    pub original_price: String,
    #[serde(deserialize_with = "lenient::int")]
    pub item_status: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub item_status_str: String,
    #[serde(deserialize_with = "lenient::uint")]
    pub want_cnt: u64,
    #[serde(deserialize_with = "lenient::uint")]
    pub browse_cnt: u64,
    #[serde(deserialize_with = "lenient::uint")]
    pub collect_cnt: u64,
    #[serde(deserialize_with = "lenient::int")]
    pub gmt_create: i64,
    #[serde(deserialize_with = "lenient::uint")]
    pub quantity: u64,
    #[serde(deserialize_with = "lenient::string")]
    pub video_url: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub image_infos: Vec<RawImageInfo>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub sku_list: Vec<RawSku>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub cpv_labels: Vec<RawCpvLabel>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub common_tags: Vec<RawTagText>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub item_label_ext_list: Vec<RawTagText>,
    #[serde(deserialize_with = "lenient::string")]
    pub transport_fee: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawImageInfo {
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub major: bool,
    #[serde(deserialize_with = "lenient::uint")]
    pub width_size: u64,
    #[serde(deserialize_with = "lenient::uint")]
    pub height_size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawSku {
    #[serde(deserialize_with = "lenient::string")]
    pub sku_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub inventory_id: String,
    #[serde(deserialize_with = "lenient::uint")]
    pub price_in_cent: u64,
    #[serde(deserialize_with = "lenient::uint")]
    pub quantity: u64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub property_list: Vec<RawSkuProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawSkuProperty {
    #[serde(deserialize_with = "lenient::string")]
    pub property_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub property_text: String,
    #[serde(deserialize_with = "lenient::string")]
    pub value_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub value_text: String,
    #[serde(deserialize_with = "lenient::string")]
    pub actual_value_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawCpvLabel {
    #[serde(deserialize_with = "lenient::string")]
    pub property_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub property_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub value_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub value_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawTagText {
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawSellerDo {
    #[serde(deserialize_with = "lenient::string")]
    pub seller_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub nick: String,
    #[serde(deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(deserialize_with = "lenient::string")]
    pub portrait_url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub signature: String,
    #[serde(deserialize_with = "lenient::uint")]
    pub item_count: u64,
    #[serde(deserialize_with = "lenient::uint")]
    pub has_sold_num_integer: u64,
    #[serde(deserialize_with = "lenient::uint")]
    pub user_reg_day: u64,
    #[serde(alias = "zhumaLevelInfo", deserialize_with = "lenient::or_default")]
    pub zhima_level_info: RawLevelInfo,
    #[serde(deserialize_with = "lenient::or_default")]
    pub idle_fish_credit_tag: RawCreditTag,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawLevelInfo {
    #[serde(deserialize_with = "lenient::string")]
    pub level_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawCreditTag {
    #[serde(deserialize_with = "lenient::or_default")]
    pub track_params: RawTrackParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTrackParams {
    #[serde(deserialize_with = "lenient::string")]
    pub seller_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_sentinels() {
        let ok = |ret: &[&str]| MtopResponse {
            ret: ret.iter().map(|s| (*s).to_string()).collect(),
            v: "1.0".to_string(),
            data: Value::Null,
        };
        assert!(ok(&["SUCCESS::调用成功"]).is_success());
        assert!(ok(&["SUCCESS"]).is_success());
        assert!(ok(&["FAIL_SYS_ILLEGAL_ACCESS::非法请求", "SUCCESS::调用成功"]).is_success());
        assert!(!ok(&["FAIL_SYS_TOKEN_EXOIRED::令牌过期"]).is_success());
        assert!(!ok(&[]).is_success());
    }

    #[test]
    fn lenient_fields_accept_mixed_types() {
        let card: RawCard = serde_json::from_value(serde_json::json!({
            "cardData": {
                "categoryId": "50025",
                "viewCount": 12,
                "detailParams": { "itemId": 7_123_456_789_i64, "isVideo": "1" },
                "priceInfo": { "price": 88 },
                "city": null
            }
        }))
        .unwrap();
        assert_eq!(card.card_data.category_id, 50025);
        assert_eq!(card.card_data.view_count, 12);
        assert_eq!(card.card_data.detail_params.item_id, "7123456789");
        assert!(card.card_data.detail_params.is_video);
        assert_eq!(card.card_data.price_info.price, "88");
        assert_eq!(card.card_data.city, "");
    }

    #[test]
    fn seller_level_info_accepts_both_spellings() {
        let a: RawSellerDo =
            serde_json::from_value(serde_json::json!({"zhimaLevelInfo": {"levelName": "信用极好"}}))
                .unwrap();
        let b: RawSellerDo =
            serde_json::from_value(serde_json::json!({"zhumaLevelInfo": {"levelName": "信用优秀"}}))
                .unwrap();
        assert_eq!(a.zhima_level_info.level_name, "信用极好");
        assert_eq!(b.zhima_level_info.level_name, "信用优秀");
    }
}
