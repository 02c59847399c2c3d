//! Read-only profitability queries over a catalog snapshot.

use thiserror::Error;

use super::entities::{CatalogEntry, CatalogSnapshot, ItemResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Floor average of the two trade bounds. Matches the `average_price`
/// embedded in query results for the same inputs.
pub fn average_price(high: i64, low: i64) -> i64 {
    (high + low).div_euclid(2)
}

/// Stateless query engine over an immutable [`CatalogSnapshot`].
///
/// Every query is a pure function of the snapshot and its arguments, so
/// concurrent callers need no locking. Fresh data means a new snapshot and a
/// new engine.
pub struct MarginEngine {
    snapshot: CatalogSnapshot,
}

impl MarginEngine {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Exact-id lookup. An item missing a price bound is still returned, with
    /// the derived fields absent; an unknown id yields `None`.
    pub fn lookup_by_id(&self, id: i64) -> Option<ItemResult> {
        self.snapshot.get(id).map(item_result)
    }

    /// Case-insensitive substring search over item names, tradeable items
    /// only, ordered by descending margin. An empty term matches everything.
    pub fn search_by_name(&self, term: &str) -> Vec<ItemResult> {
        let needle = term.to_lowercase();
        let mut results: Vec<ItemResult> = self
            .snapshot
            .entries()
            .iter()
            .filter(|entry| entry.price.is_tradeable())
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .map(item_result)
            .collect();
        sort_by_margin(&mut results);
        results
    }

    /// The `n` highest-margin tradeable items, fewer if the snapshot holds
    /// fewer. Negative counts are rejected before any computation.
    pub fn top_profitable(&self, n: i64) -> Result<Vec<ItemResult>, QueryError> {
        if n < 0 {
            return Err(QueryError::InvalidArgument(format!(
                "item count must be non-negative, got {n}"
            )));
        }
        let mut results: Vec<ItemResult> = self
            .snapshot
            .entries()
            .iter()
            .filter(|entry| entry.price.is_tradeable())
            .map(item_result)
            .collect();
        sort_by_margin(&mut results);
        results.truncate(n as usize);
        Ok(results)
    }
}

fn item_result(entry: &CatalogEntry) -> ItemResult {
    let average = match (entry.price.high, entry.price.low) {
        (Some(high), Some(low)) => Some(average_price(high, low)),
        _ => None,
    };
    ItemResult {
        id: entry.id,
        name: entry.name.clone(),
        margin: entry.margin(),
        average_price: average,
    }
}

// Stable descending sort; ties keep snapshot order.
fn sort_by_margin(results: &mut [ItemResult]) {
    results.sort_by(|a, b| b.margin.cmp(&a.margin));
}
