//! Object and coin identifiers.
//!
//! On an object-model ledger every quantity of a fungible token is itself an
//! object owned by an address. These newtypes keep object ids, owner
//! addresses, and coin type tags from being confused with one another.

use serde::{Deserialize, Serialize};

/// Unique identifier of an on-ledger object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Create a new object id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An address owning objects on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Fully qualified coin type tag, e.g. `0x2::sui::SUI`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinType(pub String);

impl CoinType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the ledger's native token type.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.0 == super::NATIVE_COIN_TYPE
    }
}

impl std::fmt::Display for CoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CoinType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Exact reference to an owned object: id, version, and content digest.
///
/// Owned objects are always referenced this precisely so the ledger can
/// reject the transaction if the object changed underneath us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: String,
}

impl ObjectRef {
    pub fn new(object_id: impl Into<ObjectId>, version: u64, digest: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            version,
            digest: digest.into(),
        }
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Snapshot of one coin object in a wallet, as returned by the holdings
/// query. Read once per run; selection never refetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    #[serde(rename = "coinObjectId")]
    pub object_id: ObjectId,
    #[serde(rename = "coinType")]
    pub coin_type: CoinType,
    #[serde(with = "balance_str")]
    pub balance: u64,
    pub version: u64,
    pub digest: String,
}

impl CoinRecord {
    /// The exact object reference for this coin snapshot.
    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id.clone(), self.version, self.digest.clone())
    }
}

/// Fullnodes report balances as decimal strings to survive JSON number
/// precision limits.
mod balance_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_display_roundtrip() {
        let id = ObjectId::new("0xabc");
        assert_eq!(id.as_str(), "0xabc");
        assert_eq!(format!("{id}"), "0xabc");
    }

    #[test]
    fn native_coin_type_detection() {
        assert!(CoinType::from("0x2::sui::SUI").is_native());
        assert!(!CoinType::from("0xdba3::usdc::USDC").is_native());
    }

    #[test]
    fn coin_record_balance_parses_from_string() {
        let json = r#"{
            "coinObjectId": "0x1",
            "coinType": "0x2::sui::SUI",
            "balance": "2000000000",
            "version": 7,
            "digest": "Dg1"
        }"#;
        let coin: CoinRecord = serde_json::from_str(json).unwrap();
        assert_eq!(coin.balance, 2_000_000_000);
        assert_eq!(coin.object_ref().version, 7);
    }
}
