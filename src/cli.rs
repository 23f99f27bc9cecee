//! Command-line entry point.
//!
//! A thin layer over [`Engine`]: it wires the JSON-RPC ledger, the local
//! signer, and the on-chain reserve source together, then runs one action
//! list. Defaults to simulation; `--live` commits.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::domain::{Action, Address, CoinType};
use crate::engine::{DeferredWithdraw, Engine, ExecutionMode, RunOptions, Scheduler};
use crate::error::{ConfigError, Error, Result};
use crate::ledger::{JsonRpcLedger, LedgerClient, LocalSigner, MarketReserveSource, Signer};

#[derive(Debug, Parser)]
#[command(name = "lendflow", about = "Lending-action orchestration", version)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Supply funds into the lending pool.
    Supply {
        /// Coin type to supply; defaults to the configured one.
        #[arg(long)]
        coin_type: Option<String>,
        /// Amount in raw base units.
        #[arg(long)]
        amount: u64,
        /// Commit on-chain instead of simulating.
        #[arg(long)]
        live: bool,
        /// Sign and submit as two separate calls.
        #[arg(long)]
        safe: bool,
    },
    /// Supply, refresh all reserve prices, and withdraw after a delay.
    DeferredWithdraw {
        #[arg(long)]
        coin_type: Option<String>,
        #[arg(long)]
        amount: u64,
        /// Share amount to withdraw when the timer fires.
        #[arg(long)]
        withdraw_amount: u64,
        /// Delay before the withdrawal, in seconds.
        #[arg(long, default_value_t = 60)]
        delay_secs: u64,
        #[arg(long)]
        live: bool,
        #[arg(long)]
        safe: bool,
    },
}

impl Cli {
    /// Run the parsed command against a loaded config.
    pub async fn execute(self, config: Config, signer: Arc<dyn Signer>) -> Result<()> {
        // One client handle serves the whole run, reserve lookups included.
        let ledger: Arc<dyn LedgerClient> =
            Arc::new(JsonRpcLedger::new(config.network.rpc_url.clone()));
        let reserves = Arc::new(MarketReserveSource::new(Arc::clone(&ledger)));
        let engine = Engine::new(ledger, signer, reserves, config.env.clone());

        match self.command {
            CliCommand::Supply {
                coin_type,
                amount,
                live,
                safe,
            } => {
                let coin_type = resolve_coin_type(&config, coin_type);
                let actions = vec![Action::Supply {
                    protocol: "SuiLend".into(),
                    coin_type: coin_type.clone(),
                    amount,
                }];
                let result = engine
                    .run(
                        &actions,
                        &RunOptions {
                            coin_type,
                            amount,
                            fee_budget: config.engine.fee_budget,
                            mode: mode_for(live, safe),
                        },
                    )
                    .await?;
                info!(result = ?result, "run finished");
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            }
            CliCommand::DeferredWithdraw {
                coin_type,
                amount,
                withdraw_amount,
                delay_secs,
                live,
                safe,
            } => {
                let coin_type = resolve_coin_type(&config, coin_type);
                let scheduler = Scheduler::new(engine);
                let scheduled = scheduler
                    .run_deferred_withdraw(&DeferredWithdraw {
                        protocol: "SuiLend".into(),
                        coin_type,
                        supply_amount: amount,
                        withdraw_amount,
                        delay: Duration::from_secs(delay_secs),
                        fee_budget: config.engine.fee_budget,
                        mode: mode_for(live, safe),
                    })
                    .await?;
                info!(capability = %scheduled.capability(), "withdrawal scheduled; waiting");
                match scheduled.join().await {
                    Some(result) => {
                        let result = result?;
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    None => info!("scheduled withdrawal was cancelled"),
                }
                Ok(())
            }
        }
    }
}

fn mode_for(live: bool, safe: bool) -> ExecutionMode {
    if live {
        ExecutionMode::Live { safe_mode: safe }
    } else {
        ExecutionMode::Simulate
    }
}

fn resolve_coin_type(config: &Config, flag: Option<String>) -> CoinType {
    CoinType::new(flag.unwrap_or_else(|| config.engine.coin_type.clone()))
}

/// Build the local signer from the wallet section. Both the private key and
/// the owner address must be configured.
pub fn local_signer(config: &Config) -> Result<Arc<dyn Signer>> {
    let key = config
        .wallet
        .private_key
        .as_deref()
        .ok_or(Error::Config(ConfigError::MissingField {
            field: "wallet.private_key",
        }))?;
    let address = config
        .wallet
        .address
        .clone()
        .ok_or(Error::Config(ConfigError::MissingField {
            field: "wallet.address",
        }))?;
    Ok(Arc::new(LocalSigner::from_hex(key, Address::new(address))?))
}
