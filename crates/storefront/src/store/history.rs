//! Recently viewed products.

use serde::{Deserialize, Serialize};

use satchel_core::ProductId;

/// Maximum number of remembered product views.
pub const HISTORY_LIMIT: usize = 10;

/// Product ids, most recently viewed first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct BrowsingHistory {
    ids: Vec<ProductId>,
}

impl BrowsingHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Move `id` to the front, evicting the oldest views beyond the limit.
    pub fn record(&mut self, id: ProductId) {
        self.ids.retain(|existing| existing != &id);
        self.ids.insert(0, id);
        self.ids.truncate(HISTORY_LIMIT);
    }

    /// Ids joined with `", "`, as embedded in recommendation prompts.
    #[must_use]
    pub fn joined(&self) -> String {
        self.ids
            .iter()
            .map(ProductId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Vec<ProductId>> for BrowsingHistory {
    fn from(ids: Vec<ProductId>) -> Self {
        let mut history = Self::new();
        for id in ids {
            if history.ids.len() == HISTORY_LIMIT {
                break;
            }
            if !history.ids.contains(&id) {
                history.ids.push(id);
            }
        }
        history
    }
}

impl From<BrowsingHistory> for Vec<ProductId> {
    fn from(history: BrowsingHistory) -> Self {
        history.ids
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_view_keeps_single_entry() {
        let mut history = BrowsingHistory::new();
        for _ in 0..3 {
            history.record(ProductId::new("a"));
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_revisit_moves_to_front() {
        let mut history = BrowsingHistory::new();
        history.record(ProductId::new("a"));
        history.record(ProductId::new("b"));
        history.record(ProductId::new("a"));
        assert_eq!(history.joined(), "a, b");
    }

    #[test]
    fn test_eleven_views_keep_last_ten_most_recent_first() {
        let mut history = BrowsingHistory::new();
        for n in 1..=11 {
            history.record(ProductId::new(n.to_string()));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        let ids: Vec<&str> = history.ids().iter().map(ProductId::as_str).collect();
        assert_eq!(ids, ["11", "10", "9", "8", "7", "6", "5", "4", "3", "2"]);
    }

    #[test]
    fn test_deserialize_caps_and_dedups() {
        let json = serde_json::to_string(
            &(0..15).map(|n| format!("p{}", n % 12)).collect::<Vec<_>>(),
        )
        .unwrap();
        let history: BrowsingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.ids().first().unwrap().as_str(), "p0");
    }
}
