//! Execution outcome types.
//!
//! A run terminates in exactly one of two shapes: a simulation report (cheap
//! inspection plus, when that succeeded, a full dry run) or a committed live
//! result. Simulation failures are data, not errors; they come back to the
//! caller in full rather than being retried.

use serde::{Deserialize, Serialize};

use super::coin::{Address, ObjectId};

/// Terminal status a transaction (real or simulated) reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
    /// Placeholder used by stub outcomes when a step was never attempted.
    Unknown,
}

impl ExecutionStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// An object newly created by a transaction, with its post-execution owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedObject {
    pub object_id: ObjectId,
    pub owner: Option<Address>,
}

/// Fee cost breakdown from a dry run or committed execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub computation_cost: u64,
    pub storage_cost: u64,
    pub storage_rebate: u64,
}

impl FeeSummary {
    /// Net fee charged after the storage rebate.
    #[must_use]
    pub fn net(&self) -> u64 {
        (self.computation_cost + self.storage_cost).saturating_sub(self.storage_rebate)
    }
}

/// Effects of a transaction: status, object changes, fee estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub created: Vec<CreatedObject>,
    #[serde(default)]
    pub mutated: Vec<ObjectId>,
    #[serde(default)]
    pub fee: Option<FeeSummary>,
}

impl TransactionEffects {
    /// Effects representing a step that never ran.
    #[must_use]
    pub fn stub() -> Self {
        Self {
            status: ExecutionStatus::Unknown,
            created: Vec::new(),
            mutated: Vec::new(),
            fee: None,
        }
    }
}

/// Result of the cheap pre-flight inspection of a call-only payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectOutcome {
    /// Inspection-level error, reported before any effects exist.
    pub error: Option<String>,
    pub effects: Option<TransactionEffects>,
}

impl InspectOutcome {
    /// The full dry run is only worth attempting when inspection reported
    /// neither an error nor a non-success status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self
                .effects
                .as_ref()
                .is_some_and(|e| e.status.is_success())
    }
}

/// Result of the full-fidelity, non-committing dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunOutcome {
    pub effects: TransactionEffects,
}

impl DryRunOutcome {
    /// Outcome for a dry run that was never attempted.
    #[must_use]
    pub fn stub() -> Self {
        Self {
            effects: TransactionEffects::stub(),
        }
    }
}

/// What a run hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ExecutionResult {
    /// Non-committing simulation. `dry_run` is a stub when inspection failed
    /// or a transport error interrupted either step.
    Simulated {
        inspect: Option<InspectOutcome>,
        dry_run: DryRunOutcome,
    },
    /// Committed on-chain execution, returned only after finality.
    Live {
        digest: String,
        effects: TransactionEffects,
    },
}

impl ExecutionResult {
    /// Effects of whichever path ran, preferring committed over estimated.
    #[must_use]
    pub fn effects(&self) -> &TransactionEffects {
        match self {
            Self::Simulated { dry_run, .. } => &dry_run.effects,
            Self::Live { effects, .. } => effects,
        }
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}
