//! Profitability query engine for Grand Exchange item flipping.
//!
//! The [`infra::wiki::WikiClient`] fetches the item mapping and the latest
//! price snapshot from the runescape.wiki price index and merges them into an
//! immutable [`domain::CatalogSnapshot`]; the [`domain::MarginEngine`] answers
//! lookup, search, and top-N margin queries over it.

pub mod domain;
pub mod infra;
pub mod util;
