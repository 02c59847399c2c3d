use std::collections::HashMap;

/// Name reported for price records whose id is absent from the item mapping.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown";

/// Item identity from the mapping endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemIdentity {
    pub id: i64,
    pub name: String,
}

/// Latest trade bounds for one item. Either bound may be absent when the
/// item has not traded recently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PricePoint {
    pub high: Option<i64>,
    pub low: Option<i64>,
}

impl PricePoint {
    /// An item is tradeable for margin purposes only when both bounds exist.
    pub fn is_tradeable(&self) -> bool {
        self.high.is_some() && self.low.is_some()
    }
}

/// One merged snapshot entry: an identity joined with its latest bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub price: PricePoint,
}

impl CatalogEntry {
    /// Flip margin, `high - low`. Negative margins from inverted upstream
    /// bounds are kept as-is, never clamped.
    pub fn margin(&self) -> Option<i64> {
        Some(self.price.high? - self.price.low?)
    }
}

/// Immutable point-in-time merge of the identity and price datasets.
///
/// Entries are held in ascending id order; that is the snapshot's natural
/// order and the tie-break order for equal margins.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<i64, usize>,
}

impl CatalogSnapshot {
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by_key(|entry| entry.id);
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id, index))
            .collect();
        Self { entries, by_id }
    }

    pub fn get(&self, id: i64) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&index| &self.entries[index])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Query result shared by lookup, search, and ranking.
///
/// `margin` and `average_price` are absent when the item is missing a price
/// bound; ranked queries exclude such items, direct lookup surfaces them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemResult {
    pub id: i64,
    pub name: String,
    pub margin: Option<i64>,
    pub average_price: Option<i64>,
}
