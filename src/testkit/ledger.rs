//! Scripted mock ledger.
//!
//! [`MockLedger`] answers each [`LedgerClient`](crate::ledger::LedgerClient)
//! operation from a per-method queue (front first) and falls back to a
//! benign default when the queue is empty. Every call is recorded so tests
//! can assert what was — and was not — issued over the wire.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    Address, CoinRecord, DryRunOutcome, ExecutionStatus, InspectOutcome, ObjectId,
    TransactionEffects,
};
use crate::error::{Error, Result};
use crate::ledger::{LedgerClient, ObjectSnapshot, Signature, Signer, SubmitReceipt};
use crate::tx::{TransactionData, TransactionKind};

/// Scripted reply: a value or a simulated transport failure.
pub enum Scripted<T> {
    Ok(T),
    TransportError(String),
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::TransportError(message) => Err(Error::Rpc(message)),
        }
    }
}

#[derive(Default)]
pub struct MockLedger {
    coins: Vec<CoinRecord>,
    objects: Mutex<HashMap<ObjectId, ObjectSnapshot>>,
    inspects: Mutex<VecDeque<Scripted<InspectOutcome>>>,
    dry_runs: Mutex<VecDeque<Scripted<DryRunOutcome>>>,
    executions: Mutex<VecDeque<Scripted<SubmitReceipt>>>,
    finalities: Mutex<VecDeque<Scripted<TransactionEffects>>>,
    calls: Mutex<Vec<String>>,
    kinds: Mutex<Vec<TransactionKind>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wallet snapshot returned by `query_holdings`.
    pub fn with_coins(mut self, coins: Vec<CoinRecord>) -> Self {
        self.coins = coins;
        self
    }

    /// Pin an explicit snapshot for one object id.
    pub fn insert_object(&self, snapshot: ObjectSnapshot) {
        self.objects
            .lock()
            .insert(snapshot.object_id.clone(), snapshot);
    }

    pub fn script_inspect(&self, outcome: InspectOutcome) {
        self.inspects.lock().push_back(Scripted::Ok(outcome));
    }

    pub fn script_inspect_error(&self, message: &str) {
        self.inspects
            .lock()
            .push_back(Scripted::TransportError(message.into()));
    }

    pub fn script_dry_run(&self, outcome: DryRunOutcome) {
        self.dry_runs.lock().push_back(Scripted::Ok(outcome));
    }

    pub fn script_dry_run_error(&self, message: &str) {
        self.dry_runs
            .lock()
            .push_back(Scripted::TransportError(message.into()));
    }

    pub fn script_execution(&self, receipt: SubmitReceipt) {
        self.executions.lock().push_back(Scripted::Ok(receipt));
    }

    pub fn script_execution_error(&self, message: &str) {
        self.executions
            .lock()
            .push_back(Scripted::TransportError(message.into()));
    }

    pub fn script_finality(&self, effects: TransactionEffects) {
        self.finalities.lock().push_back(Scripted::Ok(effects));
    }

    /// Names of every ledger operation issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Call-only payloads passed to `inspect`, in order.
    pub fn inspected_kinds(&self) -> Vec<TransactionKind> {
        self.kinds.lock().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn default_snapshot(id: &ObjectId) -> ObjectSnapshot {
        ObjectSnapshot {
            object_id: id.clone(),
            version: 1,
            digest: format!("D{id}"),
            object_type: None,
            content: None,
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn query_holdings(&self, owner: &Address) -> Result<Vec<CoinRecord>> {
        self.record(format!("query_holdings:{owner}"));
        Ok(self.coins.clone())
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectSnapshot> {
        self.record(format!("get_object:{id}"));
        Ok(self
            .objects
            .lock()
            .get(id)
            .cloned()
            .unwrap_or_else(|| Self::default_snapshot(id)))
    }

    async fn inspect(&self, _sender: &Address, kind: &TransactionKind) -> Result<InspectOutcome> {
        self.record("inspect");
        self.kinds.lock().push(kind.clone());
        match self.inspects.lock().pop_front() {
            Some(scripted) => scripted.into_result(),
            None => Ok(InspectOutcome {
                error: None,
                effects: Some(TransactionEffects {
                    status: ExecutionStatus::Success,
                    created: Vec::new(),
                    mutated: Vec::new(),
                    fee: None,
                }),
            }),
        }
    }

    async fn dry_run(&self, _data: &TransactionData) -> Result<DryRunOutcome> {
        self.record("dry_run");
        match self.dry_runs.lock().pop_front() {
            Some(scripted) => scripted.into_result(),
            None => Ok(DryRunOutcome {
                effects: TransactionEffects {
                    status: ExecutionStatus::Success,
                    created: Vec::new(),
                    mutated: Vec::new(),
                    fee: None,
                },
            }),
        }
    }

    async fn execute(
        &self,
        _data: &TransactionData,
        _signature: &Signature,
    ) -> Result<SubmitReceipt> {
        self.record("execute");
        match self.executions.lock().pop_front() {
            Some(scripted) => scripted.into_result(),
            None => Ok(SubmitReceipt {
                digest: "0xmockdigest".into(),
                effects: None,
            }),
        }
    }

    async fn sign_and_execute(
        &self,
        data: &TransactionData,
        signer: &dyn Signer,
    ) -> Result<SubmitReceipt> {
        self.record("sign_and_execute");
        let _signature = signer.sign(data).await?;
        match self.executions.lock().pop_front() {
            Some(scripted) => scripted.into_result(),
            None => Ok(SubmitReceipt {
                digest: "0xmockdigest".into(),
                effects: None,
            }),
        }
    }

    async fn await_finality(&self, digest: &str) -> Result<TransactionEffects> {
        self.record(format!("await_finality:{digest}"));
        match self.finalities.lock().pop_front() {
            Some(scripted) => scripted.into_result(),
            None => Ok(TransactionEffects {
                status: ExecutionStatus::Success,
                created: Vec::new(),
                mutated: Vec::new(),
                fee: None,
            }),
        }
    }
}
