//! Builders for domain fixtures and static collaborator stand-ins.

use async_trait::async_trait;

use crate::config::EnvConfig;
use crate::domain::{
    Address, CoinRecord, CreatedObject, ExecutionStatus, ObjectId, ReserveInfo,
    TransactionEffects,
};
use crate::error::Result;
use crate::ledger::{ReserveSource, Signature, Signer};
use crate::tx::TransactionData;

/// A coin object snapshot with a digest derived from its id.
pub fn coin(id: &str, coin_type: &str, balance: u64) -> CoinRecord {
    CoinRecord {
        object_id: id.into(),
        coin_type: coin_type.into(),
        balance,
        version: 1,
        digest: format!("D{id}"),
    }
}

/// A reserve slot for `coin_type` with the given price reference.
pub fn reserve(coin_type: &str, price_info_id: &str) -> ReserveInfo {
    ReserveInfo {
        coin_type: coin_type.into(),
        price: "1000000".into(),
        smoothed_price: "1000000".into(),
        last_update_timestamp_s: "1700000000".into(),
        price_info_id: price_info_id.into(),
    }
}

/// Success effects creating the given objects, owned by `owner`.
pub fn success_effects(created_ids: &[&str], owner: &str) -> TransactionEffects {
    TransactionEffects {
        status: ExecutionStatus::Success,
        created: created_ids
            .iter()
            .map(|id| CreatedObject {
                object_id: ObjectId::from(*id),
                owner: Some(Address::from(owner)),
            })
            .collect(),
        mutated: Vec::new(),
        fee: None,
    }
}

/// Signer producing a constant signature for a fixed address.
pub struct StaticSigner {
    address: Address,
}

impl StaticSigner {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl Signer for StaticSigner {
    fn address(&self) -> Address {
        self.address.clone()
    }

    async fn sign(&self, _data: &TransactionData) -> Result<Signature> {
        Ok(Signature("static-signature".into()))
    }
}

/// Reserve source returning a fixed, ordered list.
pub struct StaticReserves {
    reserves: Vec<ReserveInfo>,
}

impl StaticReserves {
    pub fn new(reserves: Vec<ReserveInfo>) -> Self {
        Self { reserves }
    }
}

#[async_trait]
impl ReserveSource for StaticReserves {
    async fn fetch_reserves(&self, _env: &EnvConfig) -> Result<Vec<ReserveInfo>> {
        Ok(self.reserves.clone())
    }
}
