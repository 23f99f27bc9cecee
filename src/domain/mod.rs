//! Ledger-agnostic domain types: actions, coins, reserves, outcomes.

pub mod action;
pub mod coin;
pub mod outcome;
pub mod reserve;

pub use action::Action;
pub use coin::{Address, CoinRecord, CoinType, ObjectId, ObjectRef};
pub use outcome::{
    CreatedObject, DryRunOutcome, ExecutionResult, ExecutionStatus, FeeSummary, InspectOutcome,
    TransactionEffects,
};
pub use reserve::ReserveInfo;

/// Coin type of the ledger's native token, used for fee payment and staking.
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";
