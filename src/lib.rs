//! Lendflow - declarative lending-action orchestration.
//!
//! This crate turns a list of high-level financial actions (supply funds
//! into a lending pool, withdraw them, refresh a price reference) into one
//! atomically-submitted transaction against an object-model ledger, executed
//! either as a non-committing simulation or a committing live run.
//!
//! # Architecture
//!
//! The pipeline is linear and each stage is a separate module:
//!
//! - **[`tx::selector`]** - picks the funding coin and a distinct fee coin
//!   from the wallet snapshot
//! - **[`tx::compiler`]** - per action kind, translates a declarative
//!   [`domain::Action`] into ordered contract calls on the shared builder
//! - **[`tx::builder`]** - accumulates calls, object references, and fee
//!   information into serializable payloads
//! - **[`engine`]** - drives the simulate or live state machine over the
//!   built payload; [`engine::scheduler`] composes the deferred-withdraw
//!   strategy on top
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment overlay
//! - [`domain`] - actions, coins, reserves, execution outcomes
//! - [`error`] - error types for the crate
//! - [`ledger`] - collaborator traits plus the JSON-RPC fullnode adapter
//!   and the reserve-metadata parser
//! - [`tx`] - coin selection, action compilation, transaction assembly
//! - [`engine`] - execution modes and the deferred-withdraw scheduler
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lendflow::config::Config;
//! use lendflow::domain::Action;
//! use lendflow::engine::{Engine, ExecutionMode, RunOptions};
//!
//! # async fn run(ledger: Arc<dyn lendflow::ledger::LedgerClient>,
//! #              signer: Arc<dyn lendflow::ledger::Signer>,
//! #              reserves: Arc<dyn lendflow::ledger::ReserveSource>) -> lendflow::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let engine = Engine::new(ledger, signer, reserves, config.env.clone());
//! let actions = vec![Action::Supply {
//!     protocol: "SuiLend".into(),
//!     coin_type: config.engine.coin_type.as_str().into(),
//!     amount: 1_000_000_000,
//! }];
//! let result = engine
//!     .run(&actions, &RunOptions {
//!         coin_type: config.engine.coin_type.as_str().into(),
//!         amount: 1_000_000_000,
//!         fee_budget: config.engine.fee_budget,
//!         mode: ExecutionMode::Simulate,
//!     })
//!     .await?;
//! println!("{result:?}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod tx;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
