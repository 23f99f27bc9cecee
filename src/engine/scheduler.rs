//! Deferred-withdraw composite strategy.
//!
//! [`Scheduler::run_deferred_withdraw`] composes three engine runs: a supply
//! (whose effects yield the obligation capability), an immediate batch
//! refresh of every known reserve price in one transaction, and a withdraw
//! armed behind a one-shot timer. Arming is in-memory only: a process
//! restart before the timer fires silently drops the withdrawal. This is
//! explicit best-effort, at-most-once behavior, not a durable schedule.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::reserve::reserve_index_for;
use crate::domain::{Action, CoinType, ExecutionResult, ObjectId};
use crate::error::{ExecutionError, Result};

use super::{Engine, ExecutionMode, RunOptions};

/// Parameters for one deferred-withdraw strategy.
#[derive(Debug, Clone)]
pub struct DeferredWithdraw {
    pub protocol: String,
    pub coin_type: CoinType,
    /// Amount supplied up front.
    pub supply_amount: u64,
    /// Share amount burned when the timer fires.
    pub withdraw_amount: u64,
    /// Delay between the refresh batch and the withdraw.
    pub delay: Duration,
    pub fee_budget: u64,
    pub mode: ExecutionMode,
}

/// Handle to an armed withdrawal.
///
/// Dropping the handle does not cancel the task; call [`cancel`] for that.
/// [`join`] awaits the fired (or cancelled) outcome.
///
/// [`cancel`]: ScheduledWithdraw::cancel
/// [`join`]: ScheduledWithdraw::join
#[derive(Debug)]
pub struct ScheduledWithdraw {
    capability: ObjectId,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<Option<Result<ExecutionResult>>>,
}

impl ScheduledWithdraw {
    /// Id of the obligation capability the withdrawal will consume.
    #[must_use]
    pub fn capability(&self) -> &ObjectId {
        &self.capability
    }

    /// Cancel the pending withdrawal. Returns false if the timer already
    /// fired (or cancel was already called); once the withdraw transaction
    /// is submitted there is nothing left to cancel.
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Await the scheduled task. `None` means it was cancelled before the
    /// timer fired; otherwise the withdraw run's result is returned.
    pub async fn join(self) -> Option<Result<ExecutionResult>> {
        self.task.await.ok().flatten()
    }
}

/// Composes supply, batch price refresh, and a timed withdraw.
#[derive(Clone)]
pub struct Scheduler {
    engine: Engine,
    /// Capabilities with a withdrawal currently armed. At most one pending
    /// withdrawal per capability.
    pending: Arc<Mutex<HashSet<ObjectId>>>,
}

impl Scheduler {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Execute the composite strategy and arm the deferred withdrawal.
    ///
    /// Fails with `MissingObligationCapability` (and arms nothing) when the
    /// supply's effects report no created objects, and with
    /// `WithdrawAlreadyScheduled` when a withdrawal for the extracted
    /// capability is already pending.
    pub async fn run_deferred_withdraw(&self, plan: &DeferredWithdraw) -> Result<ScheduledWithdraw> {
        let supply = Action::Supply {
            protocol: plan.protocol.clone(),
            coin_type: plan.coin_type.clone(),
            amount: plan.supply_amount,
        };
        let supply_opts = RunOptions {
            coin_type: plan.coin_type.clone(),
            amount: plan.supply_amount,
            fee_budget: plan.fee_budget,
            mode: plan.mode,
        };
        let supply_result = self.engine.run(&[supply], &supply_opts).await?;

        // The capability is the first created object of the supply effects.
        let capability = supply_result
            .effects()
            .created
            .first()
            .map(|c| c.object_id.clone())
            .ok_or(ExecutionError::MissingObligationCapability)?;
        info!(capability = %capability, "obligation capability captured");

        let reserves = self.engine.fetch_reserves().await?;
        let reserve_index =
            reserve_index_for(&reserves, &plan.coin_type).ok_or_else(|| {
                crate::error::CompileError::ReserveNotFound {
                    coin_type: plan.coin_type.clone(),
                }
            })?;
        let price_info_id = reserves[reserve_index as usize].price_info_id.clone();

        // One combined transaction refreshing every reserve, so no price is
        // stale when the withdrawal later executes.
        let refresh_actions: Vec<Action> = reserves
            .iter()
            .enumerate()
            .map(|(index, reserve)| Action::RefreshPrice {
                protocol: plan.protocol.clone(),
                coin_type: reserve.coin_type.clone(),
                reserve_index: index as u64,
                price_info_id: reserve.price_info_id.clone(),
            })
            .collect();
        let refresh_opts = RunOptions {
            coin_type: plan.coin_type.clone(),
            amount: 0,
            fee_budget: plan.fee_budget,
            mode: plan.mode,
        };
        self.engine.run(&refresh_actions, &refresh_opts).await?;
        info!(reserves = refresh_actions.len(), "reserve prices refreshed");

        if !self.pending.lock().insert(capability.clone()) {
            return Err(ExecutionError::WithdrawAlreadyScheduled {
                capability,
            }
            .into());
        }

        let withdraw = Action::Withdraw {
            protocol: plan.protocol.clone(),
            coin_type: plan.coin_type.clone(),
            amount: plan.withdraw_amount,
            obligation_cap_id: Some(capability.clone()),
            reserve_index: Some(reserve_index),
            price_info_id: Some(price_info_id),
        };
        let withdraw_opts = RunOptions {
            coin_type: plan.coin_type.clone(),
            amount: 0,
            fee_budget: plan.fee_budget,
            mode: plan.mode,
        };

        let engine = self.engine.clone();
        let pending = Arc::clone(&self.pending);
        let cap = capability.clone();
        let delay = plan.delay;
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        info!(capability = %capability, delay_secs = delay.as_secs(), "withdrawal armed");
        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel_rx => {
                    info!(capability = %cap, "scheduled withdrawal cancelled");
                    None
                }
                () = tokio::time::sleep(delay) => {
                    let result = engine.run(&[withdraw], &withdraw_opts).await;
                    if let Err(e) = &result {
                        warn!(capability = %cap, error = %e, "deferred withdrawal failed");
                    }
                    Some(result)
                }
            };
            pending.lock().remove(&cap);
            outcome
        });

        Ok(ScheduledWithdraw {
            capability,
            cancel: Some(cancel_tx),
            task,
        })
    }

    /// Whether a withdrawal is currently armed for the capability.
    #[must_use]
    pub fn is_pending(&self, capability: &ObjectId) -> bool {
        self.pending.lock().contains(capability)
    }
}
