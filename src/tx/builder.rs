//! Incremental transaction assembly.
//!
//! A [`TransactionBuilder`] accumulates inputs and commands in the exact
//! order the compiler appends them, then produces two serializable payloads:
//! a call-only [`TransactionKind`] for cheap inspection and a full
//! [`TransactionData`] (sender, gas payment, budget) for dry runs and live
//! submission. Shared-object versions and digests are resolved against the
//! ledger snapshot at build time, which is what lets the ledger's
//! optimistic-concurrency check reject a stale plan.
//!
//! Commands reference each other positionally: a command's return value is
//! addressed as `Argument::Result(i)` (or `NestedResult(i, j)` for
//! multi-value returns), so emission order is load-bearing and the builder
//! never reorders.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, ObjectId, ObjectRef};
use crate::error::{CompileError, Error, Result};
use crate::ledger::LedgerClient;

/// Well-known shared clock object, readable by every transaction.
pub const CLOCK_OBJECT_ID: &str = "0x6";
/// Well-known shared system state object, used by staking operations.
pub const SYSTEM_STATE_OBJECT_ID: &str = "0x5";

/// Reference to a value available inside the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Argument {
    /// Transaction input by index.
    Input(u16),
    /// Single return value of an earlier command.
    Result(u16),
    /// One value of an earlier multi-value command result.
    NestedResult(u16, u16),
}

/// A pure (non-object) input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PureValue {
    U64(#[serde(with = "u64_str")] u64),
    Address(Address),
}

mod u64_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        String::deserialize(d)?.parse().map_err(serde::de::Error::custom)
    }
}

/// An input as accumulated during compilation. Owned objects carry their
/// exact reference already; shared objects stay unresolved until build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallInput {
    Pure(PureValue),
    Owned(ObjectRef),
    /// Owned object known only by id; its exact reference resolves at build.
    OwnedById(ObjectId),
    Shared { object_id: ObjectId, mutable: bool },
}

impl CallInput {
    fn object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Pure(_) => None,
            Self::Owned(r) => Some(&r.object_id),
            Self::OwnedById(id) => Some(id),
            Self::Shared { object_id, .. } => Some(object_id),
        }
    }
}

/// An input with every object reference pinned to a version and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolvedInput {
    Pure(PureValue),
    Owned(ObjectRef),
    Shared {
        object_id: ObjectId,
        version: u64,
        digest: String,
        mutable: bool,
    },
}

/// One command of the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    MoveCall {
        package: ObjectId,
        module: String,
        function: String,
        type_args: Vec<String>,
        args: Vec<Argument>,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
}

/// Call-only payload: enough for inspection, no sender or fee information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionKind {
    pub inputs: Vec<ResolvedInput>,
    pub commands: Vec<Command>,
}

/// Full payload for dry runs and live submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub sender: Address,
    pub kind: TransactionKind,
    pub gas_payment: ObjectRef,
    pub gas_budget: u64,
}

/// Accumulates one transaction. Exclusively owned by a single in-flight run;
/// never shared between runs.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    sender: Option<Address>,
    inputs: Vec<CallInput>,
    commands: Vec<Command>,
    gas_payment: Option<ObjectRef>,
    gas_budget: Option<u64>,
}

impl TransactionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender address. May only be set once.
    pub fn set_sender(&mut self, sender: Address) -> std::result::Result<(), CompileError> {
        if let Some(existing) = &self.sender {
            return Err(CompileError::SenderAlreadySet {
                existing: existing.clone(),
            });
        }
        self.sender = Some(sender);
        Ok(())
    }

    /// Set the fee-payment object. The compiler guarantees it is distinct
    /// from any funding object used as a call input.
    pub fn set_gas_payment(&mut self, payment: ObjectRef) {
        self.gas_payment = Some(payment);
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    /// Number of commands appended so far.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// The accumulated command list, in emission order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Add a pure u64 input.
    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.push_input(CallInput::Pure(PureValue::U64(value)))
    }

    /// Add a pure address input.
    pub fn pure_address(&mut self, address: Address) -> Argument {
        self.push_input(CallInput::Pure(PureValue::Address(address)))
    }

    /// Add an owned object input by exact reference.
    pub fn object_owned(&mut self, reference: ObjectRef) -> Argument {
        self.push_object(CallInput::Owned(reference))
    }

    /// Add an owned object input by id only; the reference is pinned against
    /// the ledger snapshot when the payload is built.
    pub fn object_owned_by_id(&mut self, object_id: ObjectId) -> Argument {
        self.push_object(CallInput::OwnedById(object_id))
    }

    /// Add a shared object input; version and digest resolve at build time.
    pub fn object_shared(&mut self, object_id: ObjectId, mutable: bool) -> Argument {
        self.push_object(CallInput::Shared { object_id, mutable })
    }

    /// The shared clock object (read-only).
    pub fn clock(&mut self) -> Argument {
        self.object_shared(ObjectId::from(CLOCK_OBJECT_ID), false)
    }

    /// The shared system state object (mutable, for staking operations).
    pub fn system_state(&mut self) -> Argument {
        self.object_shared(ObjectId::from(SYSTEM_STATE_OBJECT_ID), true)
    }

    /// Append a contract call; returns the argument addressing its result.
    pub fn move_call(
        &mut self,
        package: ObjectId,
        module: &str,
        function: &str,
        type_args: Vec<String>,
        args: Vec<Argument>,
    ) -> Argument {
        let index = self.commands.len() as u16;
        self.commands.push(Command::MoveCall {
            package,
            module: module.to_string(),
            function: function.to_string(),
            type_args,
            args,
        });
        Argument::Result(index)
    }

    /// Split one amount off a coin; returns the argument for the new coin.
    pub fn split_coin(&mut self, coin: Argument, amount: Argument) -> Argument {
        let index = self.commands.len() as u16;
        self.commands.push(Command::SplitCoins {
            coin,
            amounts: vec![amount],
        });
        Argument::NestedResult(index, 0)
    }

    /// Transfer objects to a recipient address.
    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: Address) {
        let address = self.pure_address(recipient);
        self.commands.push(Command::TransferObjects { objects, address });
    }

    /// Build the call-only payload, resolving shared references against the
    /// current ledger snapshot.
    pub async fn build_kind(&self, ledger: &dyn LedgerClient) -> Result<TransactionKind> {
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            inputs.push(match input {
                CallInput::Pure(v) => ResolvedInput::Pure(v.clone()),
                CallInput::Owned(r) => ResolvedInput::Owned(r.clone()),
                CallInput::OwnedById(id) => {
                    let snapshot = ledger.get_object(id).await?;
                    ResolvedInput::Owned(ObjectRef::new(
                        id.clone(),
                        snapshot.version,
                        snapshot.digest,
                    ))
                }
                CallInput::Shared { object_id, mutable } => {
                    let snapshot = ledger.get_object(object_id).await?;
                    ResolvedInput::Shared {
                        object_id: object_id.clone(),
                        version: snapshot.version,
                        digest: snapshot.digest,
                        mutable: *mutable,
                    }
                }
            });
        }
        Ok(TransactionKind {
            inputs,
            commands: self.commands.clone(),
        })
    }

    /// Build the full payload. Requires sender, gas payment, and gas budget.
    pub async fn build(&self, ledger: &dyn LedgerClient) -> Result<TransactionData> {
        let sender = self
            .sender
            .clone()
            .ok_or(Error::Compile(CompileError::MissingField {
                action: "transaction",
                field: "sender",
            }))?;
        let gas_payment =
            self.gas_payment
                .clone()
                .ok_or(Error::Compile(CompileError::MissingField {
                    action: "transaction",
                    field: "gas_payment",
                }))?;
        let gas_budget = self
            .gas_budget
            .ok_or(Error::Compile(CompileError::MissingField {
                action: "transaction",
                field: "gas_budget",
            }))?;
        let kind = self.build_kind(ledger).await?;
        Ok(TransactionData {
            sender,
            kind,
            gas_payment,
            gas_budget,
        })
    }

    fn push_input(&mut self, input: CallInput) -> Argument {
        let index = self.inputs.len() as u16;
        self.inputs.push(input);
        Argument::Input(index)
    }

    /// Object inputs are deduplicated by identity so a reserve or clock
    /// referenced by several commands resolves to one input slot.
    fn push_object(&mut self, input: CallInput) -> Argument {
        if let Some(id) = input.object_id() {
            if let Some(existing) = self
                .inputs
                .iter()
                .position(|i| i.object_id() == Some(id))
            {
                // Widen to mutable if any use needs it.
                if let (
                    CallInput::Shared { mutable: true, .. },
                    Some(CallInput::Shared { mutable, .. }),
                ) = (&input, self.inputs.get_mut(existing))
                {
                    *mutable = true;
                }
                return Argument::Input(existing as u16);
            }
        }
        self.push_input(input)
    }
}
