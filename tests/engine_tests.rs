//! Integration tests for the execution engine.
//!
//! Each test drives a full `Engine::run` against a scripted mock ledger and
//! asserts both the returned result and the exact sequence of ledger
//! operations issued.

use std::sync::Arc;

use lendflow::config::EnvConfig;
use lendflow::domain::{
    Action, ExecutionResult, ExecutionStatus, InspectOutcome, TransactionEffects,
};
use lendflow::engine::{Engine, ExecutionMode, RunOptions};
use lendflow::error::{CompileError, Error, ExecutionError};
use lendflow::testkit::{coin, reserve, success_effects, MockLedger, StaticReserves, StaticSigner};

const OWNER: &str = "0xowner";
const SUI: &str = "0x2::sui::SUI";
const USDC: &str = "0xdba3::usdc::USDC";

fn env() -> EnvConfig {
    EnvConfig {
        package_id: "0xpkg".into(),
        lending_market_id: "0xmarket".into(),
        lending_market_type: "0xpkg::suilend::MAIN_POOL".into(),
    }
}

fn funded_ledger() -> MockLedger {
    MockLedger::new().with_coins(vec![
        coin("0xc1", USDC, 2_000_000_000),
        coin("0xfee", SUI, 1_000_000_000),
    ])
}

fn engine_with(ledger: Arc<MockLedger>) -> Engine {
    Engine::new(
        ledger,
        Arc::new(StaticSigner::new(OWNER)),
        Arc::new(StaticReserves::new(vec![
            reserve(SUI, "0xpinfo_sui"),
            reserve(USDC, "0xpinfo_usdc"),
        ])),
        env(),
    )
}

fn supply(amount: u64) -> Vec<Action> {
    vec![Action::Supply {
        protocol: "SuiLend".into(),
        coin_type: USDC.into(),
        amount,
    }]
}

fn opts(mode: ExecutionMode) -> RunOptions {
    RunOptions {
        coin_type: USDC.into(),
        amount: 1_000_000_000,
        fee_budget: 100_000_000,
        mode,
    }
}

#[tokio::test]
async fn simulate_runs_inspect_then_dry_run() {
    let ledger = Arc::new(funded_ledger());
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(&supply(1_000_000_000), &opts(ExecutionMode::Simulate))
        .await
        .unwrap();

    match result {
        ExecutionResult::Simulated { inspect, dry_run } => {
            assert!(inspect.unwrap().is_success());
            assert_eq!(dry_run.effects.status, ExecutionStatus::Success);
        }
        other => panic!("expected a simulated result, got {other:?}"),
    }

    let calls = ledger.calls();
    let inspect_pos = calls.iter().position(|c| c == "inspect").unwrap();
    let dry_run_pos = calls.iter().position(|c| c == "dry_run").unwrap();
    assert!(inspect_pos < dry_run_pos);
}

#[tokio::test]
async fn failed_inspection_skips_dry_run() {
    let ledger = Arc::new(funded_ledger());
    ledger.script_inspect(InspectOutcome {
        error: Some("MoveAbort(7) in lending_market".into()),
        effects: None,
    });
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(&supply(1_000_000_000), &opts(ExecutionMode::Simulate))
        .await
        .unwrap();

    match result {
        ExecutionResult::Simulated { inspect, dry_run } => {
            let inspect = inspect.unwrap();
            assert!(!inspect.is_success());
            assert!(inspect.error.unwrap().contains("MoveAbort"));
            assert_eq!(dry_run.effects.status, ExecutionStatus::Unknown);
        }
        other => panic!("expected a simulated result, got {other:?}"),
    }
    assert!(!ledger.calls().iter().any(|c| c == "dry_run"));
}

#[tokio::test]
async fn inspect_transport_error_degrades_to_stub() {
    let ledger = Arc::new(funded_ledger());
    ledger.script_inspect_error("connection reset");
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(&supply(1_000_000_000), &opts(ExecutionMode::Simulate))
        .await
        .unwrap();

    match result {
        ExecutionResult::Simulated { inspect, dry_run } => {
            assert!(inspect.is_none());
            assert_eq!(dry_run.effects.status, ExecutionStatus::Unknown);
        }
        other => panic!("expected a simulated result, got {other:?}"),
    }
    assert!(!ledger.calls().iter().any(|c| c == "dry_run"));
}

#[tokio::test]
async fn dry_run_transport_error_degrades_to_stub() {
    let ledger = Arc::new(funded_ledger());
    ledger.script_dry_run_error("gateway timeout");
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(&supply(1_000_000_000), &opts(ExecutionMode::Simulate))
        .await
        .unwrap();

    match result {
        ExecutionResult::Simulated { inspect, dry_run } => {
            assert!(inspect.unwrap().is_success());
            assert_eq!(dry_run.effects.status, ExecutionStatus::Unknown);
        }
        other => panic!("expected a simulated result, got {other:?}"),
    }
}

#[tokio::test]
async fn simulation_commits_nothing() {
    let ledger = Arc::new(funded_ledger());
    let engine = engine_with(Arc::clone(&ledger));

    engine
        .run(&supply(1_000_000_000), &opts(ExecutionMode::Simulate))
        .await
        .unwrap();

    let calls = ledger.calls();
    assert!(!calls.iter().any(|c| c == "execute"));
    assert!(!calls.iter().any(|c| c == "sign_and_execute"));
    assert!(!calls.iter().any(|c| c.starts_with("await_finality")));
}

#[tokio::test]
async fn live_always_awaits_finality() {
    let ledger = Arc::new(funded_ledger());
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(
            &supply(1_000_000_000),
            &opts(ExecutionMode::Live { safe_mode: false }),
        )
        .await
        .unwrap();

    assert!(result.is_live());
    match result {
        ExecutionResult::Live { digest, effects } => {
            assert_eq!(digest, "0xmockdigest");
            assert_eq!(effects.status, ExecutionStatus::Success);
        }
        other => panic!("expected a live result, got {other:?}"),
    }

    let calls = ledger.calls();
    assert!(calls.iter().any(|c| c == "sign_and_execute"));
    assert!(calls.iter().any(|c| c == "await_finality:0xmockdigest"));
}

#[tokio::test]
async fn live_supply_yields_one_created_capability_owned_by_the_sender() {
    let ledger = Arc::new(funded_ledger());
    ledger.script_finality(success_effects(&["0xcap"], OWNER));
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(
            &supply(1_000_000_000),
            &opts(ExecutionMode::Live { safe_mode: false }),
        )
        .await
        .unwrap();

    match result {
        ExecutionResult::Live { effects, .. } => {
            assert_eq!(effects.created.len(), 1);
            assert_eq!(effects.created[0].object_id.as_str(), "0xcap");
            assert_eq!(
                effects.created[0].owner.as_ref().unwrap().as_str(),
                OWNER
            );
        }
        other => panic!("expected a live result, got {other:?}"),
    }
}

#[tokio::test]
async fn safe_mode_signs_and_submits_separately() {
    let ledger = Arc::new(funded_ledger());
    let engine = engine_with(Arc::clone(&ledger));

    engine
        .run(
            &supply(1_000_000_000),
            &opts(ExecutionMode::Live { safe_mode: true }),
        )
        .await
        .unwrap();

    let calls = ledger.calls();
    assert!(calls.iter().any(|c| c == "execute"));
    assert!(!calls.iter().any(|c| c == "sign_and_execute"));
    assert!(calls.iter().any(|c| c.starts_with("await_finality")));
}

#[tokio::test]
async fn live_submission_error_propagates() {
    let ledger = Arc::new(funded_ledger());
    ledger.script_execution_error("fullnode unavailable");
    let engine = engine_with(Arc::clone(&ledger));

    let err = engine
        .run(
            &supply(1_000_000_000),
            &opts(ExecutionMode::Live { safe_mode: false }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rpc(_)));
    assert!(!ledger.calls().iter().any(|c| c.starts_with("await_finality")));
}

#[tokio::test]
async fn confirmed_failure_status_is_reported_not_raised() {
    let ledger = Arc::new(funded_ledger());
    ledger.script_finality(TransactionEffects {
        status: ExecutionStatus::Failure {
            error: "InsufficientCoinBalance".into(),
        },
        created: Vec::new(),
        mutated: Vec::new(),
        fee: None,
    });
    let engine = engine_with(Arc::clone(&ledger));

    let result = engine
        .run(
            &supply(1_000_000_000),
            &opts(ExecutionMode::Live { safe_mode: false }),
        )
        .await
        .unwrap();

    match result {
        ExecutionResult::Live { effects, .. } => {
            assert!(matches!(effects.status, ExecutionStatus::Failure { .. }));
        }
        other => panic!("expected a live result, got {other:?}"),
    }
}

#[tokio::test]
async fn unsupported_action_issues_no_ledger_calls() {
    let ledger = Arc::new(funded_ledger());
    let engine = engine_with(Arc::clone(&ledger));

    let actions = vec![Action::Swap {
        protocol: "SuiLend".into(),
        coin_type: USDC.into(),
        amount: 1,
    }];
    let err = engine
        .run(&actions, &opts(ExecutionMode::Simulate))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Compile(CompileError::UnsupportedAction { kind: "swap" })
    ));
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn empty_action_list_is_rejected() {
    let ledger = Arc::new(funded_ledger());
    let engine = engine_with(Arc::clone(&ledger));

    let err = engine
        .run(&[], &opts(ExecutionMode::Simulate))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Execution(ExecutionError::EmptyActionList)
    ));
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn insufficient_funding_balance_fails_the_run() {
    let ledger = Arc::new(MockLedger::new().with_coins(vec![
        coin("0xc1", USDC, 500_000),
        coin("0xfee", SUI, 1_000_000_000),
    ]));
    let engine = engine_with(Arc::clone(&ledger));

    let err = engine
        .run(&supply(1_000_000_000), &opts(ExecutionMode::Simulate))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Execution(ExecutionError::InsufficientFunds { .. })
    ));
}

#[tokio::test]
async fn funding_coin_never_doubles_as_fee_payer() {
    // One native coin covers the supply amount but there is no second coin
    // to pay fees with.
    let ledger = Arc::new(MockLedger::new().with_coins(vec![coin("0xc1", SUI, 5_000_000_000)]));
    let engine = engine_with(Arc::clone(&ledger));

    let actions = vec![Action::Supply {
        protocol: "SuiLend".into(),
        coin_type: SUI.into(),
        amount: 1_000_000_000,
    }];
    let err = engine
        .run(
            &actions,
            &RunOptions {
                coin_type: SUI.into(),
                amount: 1_000_000_000,
                fee_budget: 100_000_000,
                mode: ExecutionMode::Simulate,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Execution(ExecutionError::NoFeeCoin { .. })
    ));
}

#[tokio::test]
async fn identical_runs_compile_identical_payloads() {
    let first_ledger = Arc::new(funded_ledger());
    let second_ledger = Arc::new(funded_ledger());
    let actions = supply(1_000_000_000);

    engine_with(Arc::clone(&first_ledger))
        .run(&actions, &opts(ExecutionMode::Simulate))
        .await
        .unwrap();
    engine_with(Arc::clone(&second_ledger))
        .run(&actions, &opts(ExecutionMode::Simulate))
        .await
        .unwrap();

    assert_eq!(first_ledger.inspected_kinds(), second_ledger.inspected_kinds());
}
