//! Ledger collaborator seams.
//!
//! The engine never talks to a fullnode directly; it goes through the
//! [`LedgerClient`] and [`Signer`] traits so tests run against scripted
//! mocks and production runs against [`rpc::JsonRpcLedger`]. One client
//! handle is shared read-only across all operations of a run.

pub mod reserves;
pub mod rpc;
pub mod signing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Address, CoinRecord, DryRunOutcome, InspectOutcome, ObjectId, TransactionEffects,
};
use crate::error::Result;
use crate::tx::{TransactionData, TransactionKind};

pub use reserves::{MarketReserveSource, ReserveSource};
pub use rpc::JsonRpcLedger;
pub use signing::LocalSigner;

/// Point-in-time view of one on-ledger object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: String,
    pub object_type: Option<String>,
    /// Typed JSON content when requested, e.g. the lending market's fields.
    pub content: Option<serde_json::Value>,
}

/// A detached transaction signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

/// Receipt returned by a submission call, before finality is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub digest: String,
    pub effects: Option<TransactionEffects>,
}

/// Read and submit operations against the ledger.
///
/// All methods are non-blocking at the caller boundary; within one run they
/// are awaited strictly sequentially. The engine adds no retries or timeouts
/// of its own on top of the transport's.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// All coin objects owned by an address, in ledger-reported order.
    async fn query_holdings(&self, owner: &Address) -> Result<Vec<CoinRecord>>;

    /// Current version, digest, and content of one object.
    async fn get_object(&self, id: &ObjectId) -> Result<ObjectSnapshot>;

    /// Cheap non-committing execution of a call-only payload.
    async fn inspect(&self, sender: &Address, kind: &TransactionKind) -> Result<InspectOutcome>;

    /// Full-fidelity non-committing execution with fee estimation.
    async fn dry_run(&self, data: &TransactionData) -> Result<DryRunOutcome>;

    /// Submit a payload with a detached signature ("safe mode").
    async fn execute(&self, data: &TransactionData, signature: &Signature)
        -> Result<SubmitReceipt>;

    /// Sign and submit in a single call.
    async fn sign_and_execute(
        &self,
        data: &TransactionData,
        signer: &dyn Signer,
    ) -> Result<SubmitReceipt>;

    /// Wait until the transaction's effects are confirmed irreversible.
    async fn await_finality(&self, digest: &str) -> Result<TransactionEffects>;
}

/// Signing capability. Key material stays behind this trait.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Address the signature authorizes spending from.
    fn address(&self) -> Address;

    /// Produce a detached signature over the payload.
    async fn sign(&self, data: &TransactionData) -> Result<Signature>;
}
