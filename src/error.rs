use thiserror::Error;

use crate::domain::{Address, CoinType, ObjectId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while compiling actions into transaction commands.
///
/// All of these are detected before any network call is issued; a failing
/// action appends nothing to the builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unsupported action kind: {kind}")]
    UnsupportedAction { kind: &'static str },

    #[error("no reserve found for coin type {coin_type}")]
    ReserveNotFound { coin_type: CoinType },

    #[error("{action} action missing required field: {field}")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },

    #[error("sender already set to {existing}")]
    SenderAlreadySet { existing: Address },
}

/// Execution-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("no coin of type {coin_type} with balance >= {requested}")]
    InsufficientFunds { coin_type: CoinType, requested: u64 },

    #[error("no separate fee coin with balance >= {min_balance}")]
    NoFeeCoin { min_balance: u64 },

    #[error("object {id} not found on ledger")]
    ObjectNotFound { id: ObjectId },

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("supply effects contain no created objects; obligation capability unavailable")]
    MissingObligationCapability,

    #[error("a withdrawal is already scheduled for capability {capability}")]
    WithdrawAlreadyScheduled { capability: ObjectId },

    #[error("action list is empty")]
    EmptyActionList,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("ledger RPC error: {0}")]
    Rpc(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
