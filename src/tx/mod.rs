//! Transaction construction: coin selection, command assembly, and the
//! per-action compiler that bridges declarative actions to contract calls.

pub mod builder;
pub mod compiler;
pub mod selector;

pub use builder::{
    Argument, CallInput, Command, PureValue, ResolvedInput, TransactionBuilder, TransactionData,
    TransactionKind,
};
pub use compiler::{compile_action, CompileContext, CompiledAction};
pub use selector::CoinSelector;
