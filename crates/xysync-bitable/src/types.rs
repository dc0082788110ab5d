//! Response shapes of the destination store's open API.
//!
//! Every endpoint wraps its payload as `{ "code": 0, "msg": "..", "data": .. }`;
//! a non-zero `code` is an API error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantTokenResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub tenant_access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expire: u64,
}

/// One page of a `page_token`/`has_more` listing.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Page<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: Option<String>,
}

/// A table inside the app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableInfo {
    pub table_id: String,
    #[serde(default)]
    pub name: String,
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldInfo {
    pub field_id: String,
    pub field_name: String,
    #[serde(rename = "type", default)]
    pub field_type: u32,
}

/// A stored row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordInfo {
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateTableData {
    pub table_id: Option<String>,
    pub table: Option<TableInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateFieldData {
    pub field: FieldInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchCreateData {
    #[serde(default)]
    pub records: Vec<RecordInfo>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub filter: SearchFilter<'a>,
    pub automatic_fields: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchFilter<'a> {
    pub conjunction: &'static str,
    pub conditions: Vec<SearchCondition<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchCondition<'a> {
    pub field_name: &'a str,
    pub operator: &'static str,
    pub value: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewRecord {
    pub fields: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_decodes() {
        let env: Envelope<Page<TableInfo>> =
            serde_json::from_str(r#"{"code": 1254013, "msg": "TableNameDuplicated"}"#).unwrap();
        assert_eq!(env.code, 1_254_013);
        assert!(env.data.is_none());
    }

    #[test]
    fn page_defaults_when_fields_absent() {
        let page: Page<TableInfo> = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert!(page.page_token.is_none());
    }

    #[test]
    fn search_request_serializes_filter() {
        let req = SearchRequest {
            filter: SearchFilter {
                conjunction: "and",
                conditions: vec![SearchCondition {
                    field_name: "itemId",
                    operator: "is",
                    value: vec!["A"],
                }],
            },
            automatic_fields: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["filter"]["conjunction"], "and");
        assert_eq!(json["filter"]["conditions"][0]["operator"], "is");
        assert_eq!(json["filter"]["conditions"][0]["value"][0], "A");
    }
}
