//! Inclusion predicates applied to parsed feed items.

use crate::item::FeedItem;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A zero in either dimension disables that constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub min_want_count: u32,
    pub days_within: u32,
}

impl FeedFilter {
    #[must_use]
    pub fn new(min_want_count: u32, days_within: u32) -> Self {
        Self {
            min_want_count,
            days_within,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.min_want_count == 0 && self.days_within == 0
    }

    /// Evaluates the predicate against a fixed clock.
    ///
    /// Items without a publish time always pass the recency check.
    #[must_use]
    pub fn matches_at(&self, item: &FeedItem, now_ms: i64) -> bool {
        if self.min_want_count > 0 && item.want_count < self.min_want_count {
            return false;
        }
        let published = item.publish_time_ms();
        if self.days_within > 0 && published > 0 {
            let cutoff = now_ms.saturating_sub(i64::from(self.days_within) * DAY_MS);
            if published < cutoff {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn matches(&self, item: &FeedItem) -> bool {
        self.matches_at(item, chrono::Utc::now().timestamp_millis())
    }
}

/// Keeps the items that satisfy `filter`, preserving order.
#[must_use]
pub fn filter_items(items: Vec<FeedItem>, filter: &FeedFilter) -> Vec<FeedItem> {
    filter_items_at(items, filter, chrono::Utc::now().timestamp_millis())
}

#[must_use]
pub fn filter_items_at(items: Vec<FeedItem>, filter: &FeedFilter, now_ms: i64) -> Vec<FeedItem> {
    if filter.is_noop() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| filter.matches_at(item, now_ms))
        .collect()
}
