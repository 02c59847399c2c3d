//! Domain logic for margin queries lives here.

pub mod engine;
pub mod entities;

pub use engine::{average_price, MarginEngine, QueryError};
pub use entities::{
    CatalogEntry, CatalogSnapshot, ItemIdentity, ItemResult, PricePoint, UNKNOWN_ITEM_NAME,
};
