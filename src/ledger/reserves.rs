//! Reserve metadata lookup.
//!
//! [`MarketReserveSource`] reads the shared lending-market object and parses
//! its static `reserves` vector into ordered [`ReserveInfo`] entries. The
//! order is preserved exactly as reported on chain because a reserve's
//! position doubles as its on-chain identifier.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::EnvConfig;
use crate::domain::{CoinType, ObjectId, ReserveInfo};
use crate::error::{Error, Result};

use super::LedgerClient;

/// Source of the ordered reserve list for a lending market.
#[async_trait]
pub trait ReserveSource: Send + Sync {
    async fn fetch_reserves(&self, env: &EnvConfig) -> Result<Vec<ReserveInfo>>;
}

/// Parses reserves out of the lending-market object's typed content.
///
/// Shares the run's ledger handle rather than owning a client of its own.
pub struct MarketReserveSource {
    ledger: Arc<dyn LedgerClient>,
}

impl MarketReserveSource {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl ReserveSource for MarketReserveSource {
    async fn fetch_reserves(&self, env: &EnvConfig) -> Result<Vec<ReserveInfo>> {
        info!(market = %env.lending_market_id, "loading lending market object");
        let market = self.ledger.get_object(&env.lending_market_id).await?;
        let content = market
            .content
            .ok_or_else(|| Error::Parse("lending market object has no content".into()))?;

        let reserves = parse_reserves(&content)?;
        info!(reserves = reserves.len(), "parsed static reserves");
        Ok(reserves)
    }
}

/// Parse the `reserves` vector from the market object's field content.
pub fn parse_reserves(content: &Value) -> Result<Vec<ReserveInfo>> {
    let raw = content
        .get("reserves")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Parse("no `reserves` vector on lending market".into()))?;

    raw.iter()
        .enumerate()
        .map(|(index, entry)| parse_reserve(index, entry))
        .collect()
}

fn parse_reserve(index: usize, entry: &Value) -> Result<ReserveInfo> {
    let fields = entry
        .get("fields")
        .ok_or_else(|| Error::Parse(format!("reserve {index} missing fields")))?;

    // The coin type arrives either as a plain string or wrapped in a
    // TypeName struct; either way the address part needs its leading zeros
    // stripped to the canonical short form.
    let raw_coin = match fields.get("coin_type") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other
            .pointer("/fields/name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse(format!("reserve {index} has malformed coin_type")))?
            .to_string(),
        None => return Err(Error::Parse(format!("reserve {index} missing coin_type"))),
    };
    let coin_type = normalize_coin_type(&raw_coin)
        .ok_or_else(|| Error::Parse(format!("reserve {index} has malformed coin_type")))?;

    let price = cell_value(fields, "price")
        .ok_or_else(|| Error::Parse(format!("reserve {index} missing price")))?;
    let smoothed_price = cell_value(fields, "smoothed_price")
        .ok_or_else(|| Error::Parse(format!("reserve {index} missing smoothed_price")))?;
    let last_update_timestamp_s = fields
        .get("price_last_update_timestamp_s")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // The price reference lives in the reserve config's additional-fields
    // bag; its id is what refresh calls take as the price-info object.
    let price_info_id = fields
        .pointer("/config/fields/element/fields/additional_fields/fields/id/id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Parse(format!("reserve {index} missing price reference id")))?;

    debug!(index, coin_type = %coin_type, price = %price, "parsed reserve");
    Ok(ReserveInfo {
        coin_type,
        price,
        smoothed_price,
        last_update_timestamp_s,
        price_info_id: ObjectId::from(price_info_id),
    })
}

/// Price cells are either plain strings or `{ fields: { value } }` structs.
fn cell_value(fields: &Value, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => other
            .pointer("/fields/value")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Normalize `addr::module::name` so the address is `0x`-prefixed with
/// leading zeros stripped, matching how coin types are written elsewhere.
fn normalize_coin_type(raw: &str) -> Option<CoinType> {
    let mut parts = raw.splitn(3, "::");
    let addr = parts.next()?;
    let module = parts.next()?;
    let name = parts.next()?;

    let hex = addr.strip_prefix("0x").unwrap_or(addr);
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let trimmed = hex.trim_start_matches('0');
    let short = if trimmed.is_empty() { "0" } else { trimmed };
    Some(CoinType::new(format!(
        "0x{}::{module}::{name}",
        short.to_ascii_lowercase()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_padded_addresses() {
        let coin = normalize_coin_type(
            "0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
        )
        .unwrap();
        assert_eq!(coin.as_str(), "0x2::sui::SUI");
    }

    #[test]
    fn rejects_non_hex_addresses() {
        assert!(normalize_coin_type("zz::sui::SUI").is_none());
        assert!(normalize_coin_type("0x2::sui").is_none());
    }

    fn market_content() -> Value {
        json!({
            "reserves": [
                {
                    "fields": {
                        "coin_type": { "fields": { "name": "0000000000000000000000000000000000000000000000000000000000000002::sui::SUI" } },
                        "price": { "fields": { "value": "3141500000" } },
                        "smoothed_price": "3141000000",
                        "price_last_update_timestamp_s": "1700000000",
                        "config": { "fields": { "element": { "fields": {
                            "additional_fields": { "fields": { "id": { "id": "0xpricecell0" } } }
                        } } } }
                    }
                },
                {
                    "fields": {
                        "coin_type": "dba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
                        "price": "1000000",
                        "smoothed_price": { "fields": { "value": "1000001" } },
                        "price_last_update_timestamp_s": "1700000001",
                        "config": { "fields": { "element": { "fields": {
                            "additional_fields": { "fields": { "id": { "id": "0xpricecell1" } } }
                        } } } }
                    }
                }
            ]
        })
    }

    #[test]
    fn parses_reserves_in_order() {
        let reserves = parse_reserves(&market_content()).unwrap();
        assert_eq!(reserves.len(), 2);
        assert_eq!(reserves[0].coin_type.as_str(), "0x2::sui::SUI");
        assert_eq!(reserves[0].price, "3141500000");
        assert_eq!(reserves[0].smoothed_price, "3141000000");
        assert_eq!(reserves[0].price_info_id.as_str(), "0xpricecell0");
        assert_eq!(
            reserves[1].coin_type.as_str(),
            "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC"
        );
    }

    #[tokio::test]
    async fn fetches_reserves_through_the_shared_ledger_handle() {
        use crate::ledger::ObjectSnapshot;
        use crate::testkit::MockLedger;

        let ledger = Arc::new(MockLedger::new());
        ledger.insert_object(ObjectSnapshot {
            object_id: "0xmarket".into(),
            version: 9,
            digest: "Dmarket".into(),
            object_type: None,
            content: Some(market_content()),
        });
        let source = MarketReserveSource::new(
            Arc::clone(&ledger) as Arc<dyn crate::ledger::LedgerClient>
        );

        let env = EnvConfig {
            package_id: "0xpkg".into(),
            lending_market_id: "0xmarket".into(),
            lending_market_type: "0xpkg::suilend::MAIN_POOL".into(),
        };
        let reserves = source.fetch_reserves(&env).await.unwrap();
        assert_eq!(reserves.len(), 2);
        // The lookup went through the handle the caller passed in.
        assert_eq!(ledger.calls(), vec!["get_object:0xmarket".to_string()]);
    }

    #[test]
    fn missing_reserves_vector_is_a_parse_error() {
        let err = parse_reserves(&json!({ "other": [] })).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn missing_price_reference_is_a_parse_error() {
        let content = json!({
            "reserves": [{
                "fields": {
                    "coin_type": "2::sui::SUI",
                    "price": "1",
                    "smoothed_price": "1",
                    "price_last_update_timestamp_s": "0",
                    "config": { "fields": {} }
                }
            }]
        });
        let err = parse_reserves(&content).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
