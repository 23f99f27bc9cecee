//! Funding and fee-coin selection.
//!
//! Selection is order-preserving first fit over the holdings snapshot, not
//! best fit: the first object that qualifies wins, which keeps runs
//! deterministic for a fixed wallet state. The fee payer must be a different
//! object than the funding coin because one object cannot be split as a call
//! input and consumed as the transaction's fee payment at the same time.

use crate::domain::{CoinRecord, CoinType, ObjectId};
use crate::error::ExecutionError;

pub struct CoinSelector;

impl CoinSelector {
    /// First coin of `coin_type` with balance covering `amount`.
    pub fn select_funding<'a>(
        coins: &'a [CoinRecord],
        coin_type: &CoinType,
        amount: u64,
    ) -> Result<&'a CoinRecord, ExecutionError> {
        coins
            .iter()
            .find(|c| &c.coin_type == coin_type && c.balance >= amount)
            .ok_or(ExecutionError::InsufficientFunds {
                coin_type: coin_type.clone(),
                requested: amount,
            })
    }

    /// First native coin distinct from `exclude` with balance covering the
    /// fee budget. `exclude` is the funding object, when the run has one.
    pub fn select_fee_payer<'a>(
        coins: &'a [CoinRecord],
        native_type: &CoinType,
        exclude: Option<&ObjectId>,
        min_balance: u64,
    ) -> Result<&'a CoinRecord, ExecutionError> {
        coins
            .iter()
            .find(|c| {
                &c.coin_type == native_type
                    && exclude != Some(&c.object_id)
                    && c.balance >= min_balance
            })
            .ok_or(ExecutionError::NoFeeCoin { min_balance })
    }
}
