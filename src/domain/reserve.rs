//! Lending-market reserve metadata.

use serde::{Deserialize, Serialize};

use super::coin::{CoinType, ObjectId};

/// One supported reserve slot of the lending market.
///
/// The slot index is the reserve's position in the market's reserve list and
/// doubles as the on-chain reserve identifier, so ordering matters and is
/// preserved from the metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveInfo {
    pub coin_type: CoinType,
    /// Raw on-chain price cell value.
    pub price: String,
    /// Exponentially smoothed price cell value.
    pub smoothed_price: String,
    /// Seconds since epoch of the last on-chain price update.
    pub last_update_timestamp_s: String,
    /// Object id of the price reference refreshed before withdrawals.
    pub price_info_id: ObjectId,
}

/// Resolve the reserve slot for a coin type: first matching position wins,
/// which keeps the mapping deterministic for a fixed reserve list.
#[must_use]
pub fn reserve_index_for(reserves: &[ReserveInfo], coin_type: &CoinType) -> Option<u64> {
    reserves
        .iter()
        .position(|r| &r.coin_type == coin_type)
        .map(|i| i as u64)
}
