//! Run orchestration: holdings, selection, compilation, execution.
//!
//! [`Engine::run`] is the single entry point: it takes a declarative action
//! list plus run options and drives one of two mutually exclusive terminal
//! state machines over the assembled payload. `Simulate` is strictly
//! non-mutating and idempotent; `Live` is irreversible the instant the
//! signed payload is broadcast — there is no cancellation path after that.
//!
//! The engine performs no retries and no backoff anywhere. Simulation-path
//! transport failures degrade into stub outcomes so the run returns data;
//! live-path transport failures propagate because the on-chain state is then
//! unknown and must not be swallowed.

pub mod scheduler;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EnvConfig;
use crate::domain::{
    Action, CoinType, DryRunOutcome, ExecutionResult, ObjectRef, ReserveInfo, NATIVE_COIN_TYPE,
};
use crate::error::{Error, ExecutionError, Result};
use crate::ledger::{LedgerClient, ReserveSource, Signer};
use crate::tx::compiler::validate_actions;
use crate::tx::{compile_action, CoinSelector, CompileContext, TransactionBuilder};

pub use scheduler::{DeferredWithdraw, ScheduledWithdraw, Scheduler};

/// Terminal execution mode, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Inspect, then dry-run. Commits nothing.
    Simulate,
    /// Sign, submit, await finality. `safe_mode` signs and submits as two
    /// separate calls instead of one.
    Live { safe_mode: bool },
}

/// Caller-supplied parameters for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub coin_type: CoinType,
    /// Amount funded from the wallet; drives funding-coin selection when the
    /// action list contains a supply.
    pub amount: u64,
    /// Fee budget in native base units.
    pub fee_budget: u64,
    pub mode: ExecutionMode,
}

/// Action-to-transaction orchestration engine.
///
/// Holds the shared, read-only collaborator handles. Cloning is cheap; each
/// run constructs its own exclusively-owned [`TransactionBuilder`].
#[derive(Clone)]
pub struct Engine {
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn Signer>,
    reserve_source: Arc<dyn ReserveSource>,
    env: EnvConfig,
}

impl Engine {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn Signer>,
        reserve_source: Arc<dyn ReserveSource>,
        env: EnvConfig,
    ) -> Self {
        Self {
            ledger,
            signer,
            reserve_source,
            env,
        }
    }

    /// The ordered reserve list from the metadata collaborator.
    pub async fn fetch_reserves(&self) -> Result<Vec<ReserveInfo>> {
        self.reserve_source.fetch_reserves(&self.env).await
    }

    /// Compile the action list into one transaction and execute it in the
    /// requested mode.
    pub async fn run(&self, actions: &[Action], opts: &RunOptions) -> Result<ExecutionResult> {
        if actions.is_empty() {
            return Err(ExecutionError::EmptyActionList.into());
        }
        // Reject uncompilable lists before the first ledger call.
        validate_actions(actions).map_err(Error::Compile)?;

        let owner = self.signer.address();
        let coins = self.ledger.query_holdings(&owner).await?;
        log_balances(&coins);

        // Funding is only selected when an action actually consumes wallet
        // funds; refresh and withdraw transactions need a fee coin only.
        let needs_funding = actions.iter().any(|a| matches!(a, Action::Supply { .. }));
        let funding = if needs_funding {
            Some(CoinSelector::select_funding(
                &coins,
                &opts.coin_type,
                opts.amount,
            )?)
        } else {
            None
        };

        let native = CoinType::from(NATIVE_COIN_TYPE);
        let fee_coin = CoinSelector::select_fee_payer(
            &coins,
            &native,
            funding.map(|c| &c.object_id),
            opts.fee_budget,
        )?;

        // Re-pin both coins against the current snapshot; the holdings query
        // may be older than the objects.
        let funding_ref = match funding {
            Some(coin) => {
                let snapshot = self.ledger.get_object(&coin.object_id).await?;
                Some(ObjectRef::new(
                    coin.object_id.clone(),
                    snapshot.version,
                    snapshot.digest,
                ))
            }
            None => None,
        };
        let fee_snapshot = self.ledger.get_object(&fee_coin.object_id).await?;
        let fee_ref = ObjectRef::new(
            fee_coin.object_id.clone(),
            fee_snapshot.version,
            fee_snapshot.digest,
        );

        let mut builder = TransactionBuilder::new();
        builder.set_sender(owner.clone()).map_err(Error::Compile)?;
        builder.set_gas_payment(fee_ref);
        builder.set_gas_budget(opts.fee_budget);

        let reserves = self.fetch_reserves().await?;
        let ctx = CompileContext {
            env: &self.env,
            owner: owner.clone(),
            funding: funding_ref,
            reserves: &reserves,
        };
        for action in actions {
            debug!(kind = action.kind(), coin_type = %action.coin_type(), "compiling action");
            compile_action(&mut builder, action, &ctx)?;
        }
        info!(
            actions = actions.len(),
            commands = builder.command_count(),
            "transaction compiled"
        );

        match opts.mode {
            ExecutionMode::Simulate => self.simulate(&builder, &owner).await,
            ExecutionMode::Live { safe_mode } => self.live(&builder, safe_mode).await,
        }
    }

    /// Non-committing path: cheap inspection first, full dry run only if the
    /// inspection reported success. Transport failures on either step degrade
    /// to a stub outcome instead of crashing the run.
    async fn simulate(
        &self,
        builder: &TransactionBuilder,
        owner: &crate::domain::Address,
    ) -> Result<ExecutionResult> {
        info!("running simulation");
        let kind = builder.build_kind(self.ledger.as_ref()).await?;

        let inspect = match self.ledger.inspect(owner, &kind).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "inspection threw; returning stub dry run");
                return Ok(ExecutionResult::Simulated {
                    inspect: None,
                    dry_run: DryRunOutcome::stub(),
                });
            }
        };

        if !inspect.is_success() {
            warn!(
                error = ?inspect.error,
                status = ?inspect.effects.as_ref().map(|e| &e.status),
                "inspection failed; skipping dry run"
            );
            return Ok(ExecutionResult::Simulated {
                inspect: Some(inspect),
                dry_run: DryRunOutcome::stub(),
            });
        }

        let data = builder.build(self.ledger.as_ref()).await?;
        let dry_run = match self.ledger.dry_run(&data).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "dry run threw; returning stub");
                return Ok(ExecutionResult::Simulated {
                    inspect: Some(inspect),
                    dry_run: DryRunOutcome::stub(),
                });
            }
        };

        info!(
            status = ?dry_run.effects.status,
            created = dry_run.effects.created.len(),
            mutated = dry_run.effects.mutated.len(),
            "dry run complete"
        );
        if !dry_run.effects.status.is_success() {
            warn!(status = ?dry_run.effects.status, "dry run reported failure");
        }

        Ok(ExecutionResult::Simulated {
            inspect: Some(inspect),
            dry_run,
        })
    }

    /// Committing path. Submission errors propagate; a confirmed non-success
    /// status is reported in the result as-is, never retried.
    async fn live(&self, builder: &TransactionBuilder, safe_mode: bool) -> Result<ExecutionResult> {
        info!(safe_mode, "running LIVE");
        let data = builder.build(self.ledger.as_ref()).await?;

        let receipt = if safe_mode {
            let signature = self.signer.sign(&data).await?;
            self.ledger.execute(&data, &signature).await?
        } else {
            self.ledger
                .sign_and_execute(&data, self.signer.as_ref())
                .await?
        };

        // Finality is always awaited before the result goes back; the
        // receipt's optimistic effects are not trusted on their own.
        let effects = self.ledger.await_finality(&receipt.digest).await?;
        if !effects.status.is_success() {
            warn!(digest = %receipt.digest, status = ?effects.status, "live execution confirmed with failure status");
        } else {
            info!(digest = %receipt.digest, created = effects.created.len(), "live execution confirmed");
        }

        Ok(ExecutionResult::Live {
            digest: receipt.digest,
            effects,
        })
    }
}

/// Log a per-coin-type balance summary of the wallet snapshot.
fn log_balances(coins: &[crate::domain::CoinRecord]) {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for coin in coins {
        *totals.entry(coin.coin_type.as_str()).or_default() += coin.balance;
    }
    for (coin_type, balance) in &totals {
        info!(coin_type, balance, "wallet balance");
    }
}
