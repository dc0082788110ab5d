//! Flattened listing records and synchronization results.

use serde::{Deserialize, Serialize};

/// One listing observation in the flat column model pushed downstream.
///
/// Text columns use an empty string for "absent", counters use zero, and
/// timestamps/URLs use `None`. Every column is always present in the
/// destination schema regardless of which source fields were available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub item_id: String,
    pub title: String,
    pub sub_title: String,
    pub price: String,
    pub original_price: String,
    pub condition: String,
    pub want_count: u32,
    pub view_count: u64,
    pub collect_count: u64,
    pub exposure_heat: u64,
    pub seller_nick: String,
    pub seller_city: String,
    pub seller_credit: String,
    pub seller_item_count: u64,
    pub seller_sold_count: u64,
    pub free_ship: String,
    pub publish_time_ms: Option<i64>,
    pub capture_time_ms: i64,
    pub cover_url: Option<String>,
    pub detail_url: Option<String>,
    pub video_url: Option<String>,
    pub tags: String,
    pub item_status: String,
    pub description: String,
}

impl Product {
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            item_id: self.item_id.clone(),
            price: self.price.clone(),
            want_count: self.want_count,
        }
    }
}

/// Identity of one observation: the same item seen again at a different
/// price or demand level is a new data point, not a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub item_id: String,
    pub price: String,
    pub want_count: u32,
}

/// Outcome of synchronizing one batch into a period table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub records_created: usize,
    pub records_updated: usize,
    pub table_id: String,
    pub skipped_duplicates: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_ignores_non_identity_fields() {
        let a = Product {
            item_id: "A".to_string(),
            price: "10".to_string(),
            want_count: 5,
            title: "first".to_string(),
            ..Product::default()
        };
        let b = Product {
            title: "renamed".to_string(),
            view_count: 99,
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn dedup_key_changes_with_want_count() {
        let a = Product {
            item_id: "A".to_string(),
            price: "10".to_string(),
            want_count: 5,
            ..Product::default()
        };
        let b = Product {
            want_count: 6,
            ..a.clone()
        };
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn sync_result_serializes_camel_case() {
        let result = SyncResult {
            success: true,
            message: "ok".to_string(),
            records_created: 2,
            table_id: "tbl1".to_string(),
            ..SyncResult::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["recordsCreated"], 2);
        assert_eq!(json["recordsUpdated"], 0);
        assert_eq!(json["tableId"], "tbl1");
        assert!(json.get("failedFields").is_none());
    }
}
