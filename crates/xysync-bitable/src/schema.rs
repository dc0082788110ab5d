//! Declared column set of every period table.
//!
//! The table below drives both table creation and field reconciliation;
//! extending the schema means adding a row here and a cell in
//! [`crate::records::product_to_fields`].

use serde::Serialize;
use serde_json::json;

/// Column types used by [`PRODUCT_FIELDS`]. The discriminant is the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text = 1,
    Number = 2,
    DateTime = 5,
    Url = 15,
}

impl FieldType {
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// One declared column: `key` is the field name in the store, `label` the
/// human-readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
}

const fn field(key: &'static str, label: &'static str, field_type: FieldType) -> FieldSpec {
    FieldSpec {
        key,
        label,
        field_type,
    }
}

pub const ITEM_ID_FIELD: &str = "itemId";
pub const PRICE_FIELD: &str = "price";
pub const WANT_COUNT_FIELD: &str = "wantCnt";

pub static PRODUCT_FIELDS: &[FieldSpec] = &[
    field(ITEM_ID_FIELD, "商品ID", FieldType::Text),
    field("title", "商品标题", FieldType::Text),
    field("subTitle", "副标题", FieldType::Text),
    field(PRICE_FIELD, "价格", FieldType::Text),
    field("originalPrice", "原价", FieldType::Text),
    field("condition", "成色", FieldType::Text),
    field(WANT_COUNT_FIELD, "想要人数", FieldType::Number),
    field("viewCount", "浏览次数", FieldType::Number),
    field("collectCount", "收藏次数", FieldType::Number),
    field("exposureHeat", "曝光热度", FieldType::Number),
    field("sellerNick", "卖家昵称", FieldType::Text),
    field("sellerCity", "卖家地区", FieldType::Text),
    field("sellerCredit", "卖家信用", FieldType::Text),
    field("sellerItemCount", "在售商品数", FieldType::Number),
    field("sellerSoldCount", "已售数量", FieldType::Number),
    field("freeShip", "包邮", FieldType::Text),
    field("publishTimeMs", "发布时间", FieldType::DateTime),
    field("captureTimeMs", "采集时间", FieldType::DateTime),
    field("coverUrl", "封面图", FieldType::Url),
    field("detailUrl", "商品详情", FieldType::Url),
    field("videoUrl", "视频链接", FieldType::Url),
    field("tags", "商品标签", FieldType::Text),
    field("itemStatusStr", "商品状态", FieldType::Text),
    field("description", "详细描述", FieldType::Text),
];

/// Request body for creating one field, standalone or inside a table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldCreate {
    pub field_name: String,
    #[serde(rename = "type")]
    pub field_type: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
}

impl From<&FieldSpec> for FieldCreate {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            field_name: spec.key.to_string(),
            field_type: spec.field_type.code(),
            description: Some(json!({ "text": spec.label })),
        }
    }
}

/// The full declared field set, in column order.
#[must_use]
pub fn product_field_creates() -> Vec<FieldCreate> {
    PRODUCT_FIELDS.iter().map(FieldCreate::from).collect()
}
