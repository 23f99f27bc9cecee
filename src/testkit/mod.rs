//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`] — [`MockLedger`](ledger::MockLedger), a scripted
//!   [`LedgerClient`](crate::ledger::LedgerClient) that records every call.
//! - [`fixtures`] — builders for coins, reserves, effects, plus
//!   `StaticSigner` and `StaticReserves`.

pub mod fixtures;
pub mod ledger;

pub use fixtures::{coin, reserve, success_effects, StaticReserves, StaticSigner};
pub use ledger::MockLedger;
