//! Thin asynchronous client for the runescape.wiki real-time prices API.
//!
//! - Provides typed accessors for the item mapping and latest-price feeds.
//! - Merges both payloads into an immutable [`CatalogSnapshot`].

use std::collections::HashMap;

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{CatalogEntry, CatalogSnapshot, ItemIdentity, PricePoint, UNKNOWN_ITEM_NAME};

const DEFAULT_BASE_URL: &str = "https://prices.runescape.wiki/api/v1/osrs/";
// The wiki asks every consumer to identify itself and leave a way to get in
// touch if the request volume becomes unreasonable.
const DEFAULT_USER_AGENT: &str = concat!(
    "ge-margin-scanner/",
    env!("CARGO_PKG_VERSION"),
    " (flip margin lookups; contact: skynatbs via GitHub issues)"
);

#[derive(Debug, Error)]
pub enum WikiClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Format(String),
}

#[derive(Clone)]
pub struct WikiClient {
    http: Client,
    base_url: Url,
}

impl WikiClient {
    pub fn new() -> Result<Self, WikiClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, WikiClientError> {
        Self::with_user_agent(base, DEFAULT_USER_AGENT)
    }

    /// Build a client with an operator-supplied descriptor; the upstream
    /// service expects contact details in it.
    pub fn with_user_agent(base: &str, user_agent: &str) -> Result<Self, WikiClientError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http, base_url })
    }

    /// Fetch both datasets and merge them into a queryable snapshot.
    ///
    /// All-or-nothing: either fetch failing aborts the load with no partial
    /// snapshot. Retrying is the caller's call, by invoking `load` again.
    pub async fn load(&self) -> Result<CatalogSnapshot, WikiClientError> {
        let (identities, prices) = tokio::try_join!(self.fetch_identities(), self.fetch_prices())?;
        let snapshot = merge(identities, prices);
        info!(items = snapshot.len(), "catalog snapshot built");
        Ok(snapshot)
    }

    /// Fetch the full id-to-name mapping.
    pub async fn fetch_identities(&self) -> Result<HashMap<i64, String>, WikiClientError> {
        let body = self.fetch_body("mapping").await?;
        let records = parse_identities(&body)?;
        Ok(records
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect())
    }

    /// Fetch the latest trade bounds, keyed by canonical item id.
    pub async fn fetch_prices(&self) -> Result<HashMap<i64, PricePoint>, WikiClientError> {
        let body = self.fetch_body("latest").await?;
        parse_prices(&body)
    }

    async fn fetch_body(&self, path: &str) -> Result<Vec<u8>, WikiClientError> {
        let url = self.base_url.join(path)?;
        debug!(%url, "requesting price index");
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Right-join the price records against the identity mapping. Every priced
/// item appears in the snapshot; names missing from the mapping fall back to
/// [`UNKNOWN_ITEM_NAME`].
pub fn merge(identities: HashMap<i64, String>, prices: HashMap<i64, PricePoint>) -> CatalogSnapshot {
    let entries = prices
        .into_iter()
        .map(|(id, price)| CatalogEntry {
            id,
            name: identities
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_ITEM_NAME.to_string()),
            price,
        })
        .collect();
    CatalogSnapshot::new(entries)
}

#[derive(Debug, Deserialize)]
struct MappingDto {
    #[serde(deserialize_with = "id_from_json")]
    id: i64,
    name: String,
}

impl From<MappingDto> for ItemIdentity {
    fn from(dto: MappingDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestEnvelope {
    data: HashMap<String, LatestPriceDto>,
}

#[derive(Debug, Deserialize)]
struct LatestPriceDto {
    #[serde(default)]
    high: Option<i64>,
    #[serde(default)]
    low: Option<i64>,
}

impl From<LatestPriceDto> for PricePoint {
    fn from(dto: LatestPriceDto) -> Self {
        Self {
            high: dto.high,
            low: dto.low,
        }
    }
}

fn parse_identities(body: &[u8]) -> Result<Vec<ItemIdentity>, WikiClientError> {
    let records: Vec<MappingDto> =
        serde_json::from_slice(body).map_err(|err| WikiClientError::Format(err.to_string()))?;
    Ok(records.into_iter().map(ItemIdentity::from).collect())
}

/// Parse the latest-price envelope, canonicalizing the stringified id keys to
/// integers once so queries never re-parse them.
fn parse_prices(body: &[u8]) -> Result<HashMap<i64, PricePoint>, WikiClientError> {
    let envelope: LatestEnvelope =
        serde_json::from_slice(body).map_err(|err| WikiClientError::Format(err.to_string()))?;
    envelope
        .data
        .into_iter()
        .map(|(key, dto)| {
            let id = key.parse::<i64>().map_err(|_| {
                WikiClientError::Format(format!("non-numeric item id {key:?} in price data"))
            })?;
            Ok((id, PricePoint::from(dto)))
        })
        .collect()
}

fn id_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct IntOrString;

    impl<'de> serde::de::Visitor<'de> for IntOrString {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer or numeric string")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            i64::try_from(value)
                .map_err(|_| E::custom(format!("item id {value} out of range")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .parse::<i64>()
                .map_err(|_| E::custom(format!("non-numeric item id {value:?}")))
        }
    }

    deserializer.deserialize_any(IntOrString)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarginEngine;

    #[test]
    fn parses_mapping_with_numeric_and_string_ids() {
        let body = br#"[{"id": 1, "name": "Dragon bones"}, {"id": "2", "name": "Shark"}]"#;
        let records = parse_identities(body).unwrap();
        assert_eq!(
            records,
            vec![
                ItemIdentity {
                    id: 1,
                    name: "Dragon bones".to_string()
                },
                ItemIdentity {
                    id: 2,
                    name: "Shark".to_string()
                },
            ]
        );
    }

    #[test]
    fn mapping_record_without_name_is_a_format_error() {
        let body = br#"[{"id": 1}]"#;
        assert!(matches!(
            parse_identities(body),
            Err(WikiClientError::Format(_))
        ));
    }

    #[test]
    fn mapping_record_with_unparseable_id_is_a_format_error() {
        let body = br#"[{"id": "abc", "name": "Broken"}]"#;
        assert!(matches!(
            parse_identities(body),
            Err(WikiClientError::Format(_))
        ));
    }

    #[test]
    fn parses_latest_with_missing_bounds() {
        let body = br#"{"data": {"1": {"high": 3000, "low": 2800}, "2": {"high": 900}, "3": {"high": null, "low": null}}}"#;
        let prices = parse_prices(body).unwrap();
        assert_eq!(
            prices[&1],
            PricePoint {
                high: Some(3000),
                low: Some(2800)
            }
        );
        assert_eq!(
            prices[&2],
            PricePoint {
                high: Some(900),
                low: None
            }
        );
        assert_eq!(prices[&3], PricePoint::default());
    }

    #[test]
    fn non_numeric_price_key_is_a_format_error() {
        let body = br#"{"data": {"not-an-id": {"high": 1, "low": 1}}}"#;
        assert!(matches!(
            parse_prices(body),
            Err(WikiClientError::Format(_))
        ));
    }

    #[test]
    fn merge_defaults_missing_names_to_unknown() {
        let identities = HashMap::from([(1, "Dragon bones".to_string())]);
        let prices = HashMap::from([
            (
                1,
                PricePoint {
                    high: Some(3000),
                    low: Some(2800),
                },
            ),
            (
                42,
                PricePoint {
                    high: Some(10),
                    low: Some(5),
                },
            ),
        ]);
        let snapshot = merge(identities, prices);
        assert_eq!(snapshot.get(42).unwrap().name, UNKNOWN_ITEM_NAME);
        assert_eq!(snapshot.get(1).unwrap().name, "Dragon bones");
    }

    #[test]
    fn merge_keeps_only_priced_items() {
        let identities = HashMap::from([
            (1, "Dragon bones".to_string()),
            (2, "Shark".to_string()),
        ]);
        let prices = HashMap::from([(
            2,
            PricePoint {
                high: Some(900),
                low: Some(850),
            },
        )]);
        let snapshot = merge(identities, prices);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get(1).is_none());
    }

    #[test]
    fn mapping_and_latest_payloads_round_trip_through_the_engine() {
        let mapping = br#"[{"id": 1, "name": "Dragon bones"}, {"id": 2, "name": "Shark"}]"#;
        let latest = br#"{"data": {"1": {"high": 3000, "low": 2800}, "2": {"high": 900, "low": 850}}}"#;
        let identities: HashMap<i64, String> = parse_identities(mapping)
            .unwrap()
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect();
        let prices = parse_prices(latest).unwrap();
        let engine = MarginEngine::new(merge(identities, prices));

        let top = engine.top_profitable(1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, 1);
        assert_eq!(top[0].margin, Some(200));

        let shark = engine.lookup_by_id(2).unwrap();
        assert_eq!(shark.name, "Shark");
        assert_eq!(shark.margin, Some(50));
        assert_eq!(shark.average_price, Some(875));
    }
}
