//! Declarative financial actions.
//!
//! An [`Action`] says *what* the caller wants; the compiler in
//! [`crate::tx::compiler`] decides which contract calls that becomes. The
//! enum is matched exhaustively, so an unhandled kind is a compile error in
//! this crate rather than a runtime string comparison.

use serde::{Deserialize, Serialize};

use super::coin::{CoinType, ObjectId};

/// One high-level action against a lending protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Supply `amount` of `coin_type` into the lending pool, minting an
    /// obligation capability that authorizes a later withdrawal.
    Supply {
        protocol: String,
        coin_type: CoinType,
        amount: u64,
    },

    /// Withdraw previously supplied funds. Requires the capability produced
    /// by an earlier supply plus the reserve slot and price reference; all
    /// three are checked at compile time.
    Withdraw {
        protocol: String,
        coin_type: CoinType,
        amount: u64,
        obligation_cap_id: Option<ObjectId>,
        reserve_index: Option<u64>,
        price_info_id: Option<ObjectId>,
    },

    /// Refresh the on-chain price reference for one reserve slot. Batched
    /// ahead of scheduled withdrawals so stale prices do not reject them.
    RefreshPrice {
        protocol: String,
        coin_type: CoinType,
        reserve_index: u64,
        price_info_id: ObjectId,
    },

    /// Declared but not implemented; compiling fails with `UnsupportedAction`.
    Swap {
        protocol: String,
        coin_type: CoinType,
        amount: u64,
    },

    /// Declared but not implemented; compiling fails with `UnsupportedAction`.
    Borrow {
        protocol: String,
        coin_type: CoinType,
        amount: u64,
    },
}

impl Action {
    /// Stable name of the action kind, used in logs and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Supply { .. } => "supply",
            Self::Withdraw { .. } => "withdraw",
            Self::RefreshPrice { .. } => "refreshPrice",
            Self::Swap { .. } => "swap",
            Self::Borrow { .. } => "borrow",
        }
    }

    /// Coin type this action operates on.
    #[must_use]
    pub fn coin_type(&self) -> &CoinType {
        match self {
            Self::Supply { coin_type, .. }
            | Self::Withdraw { coin_type, .. }
            | Self::RefreshPrice { coin_type, .. }
            | Self::Swap { coin_type, .. }
            | Self::Borrow { coin_type, .. } => coin_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let supply = Action::Supply {
            protocol: "SuiLend".into(),
            coin_type: "0x2::sui::SUI".into(),
            amount: 1,
        };
        assert_eq!(supply.kind(), "supply");

        let refresh = Action::RefreshPrice {
            protocol: "SuiLend".into(),
            coin_type: "0x2::sui::SUI".into(),
            reserve_index: 0,
            price_info_id: "0xp".into(),
        };
        assert_eq!(refresh.kind(), "refreshPrice");
    }

    #[test]
    fn action_serializes_with_kind_tag() {
        let action = Action::Supply {
            protocol: "SuiLend".into(),
            coin_type: "0x2::sui::SUI".into(),
            amount: 1_000_000_000,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "supply");
        assert_eq!(json["amount"], 1_000_000_000u64);
    }
}
