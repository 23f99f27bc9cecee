#![cfg(feature = "integration-tests")]

use std::env;
use std::time::Duration;

use lendflow::domain::ObjectId;
use lendflow::ledger::{JsonRpcLedger, LedgerClient};
use tokio::time::timeout;

fn smoke_enabled() -> bool {
    matches!(env::var("LENDFLOW_SMOKE").ok().as_deref(), Some("1"))
}

#[tokio::test]
#[ignore = "requires LENDFLOW_SMOKE=1 and network access"]
async fn smoke_fullnode_get_object_readonly() {
    if !smoke_enabled() {
        eprintln!("Skipping smoke test (set LENDFLOW_SMOKE=1 to enable)");
        return;
    }

    let rpc_url = env::var("SUI_RPC_URL")
        .unwrap_or_else(|_| "https://fullnode.mainnet.sui.io:443".to_string());
    let ledger = JsonRpcLedger::new(rpc_url.clone());

    // The shared clock object exists on every network.
    let clock = timeout(
        Duration::from_secs(20),
        ledger.get_object(&ObjectId::from("0x6")),
    )
    .await
    .expect("Timed out querying the fullnode")
    .expect("Failed to fetch the clock object");

    assert!(clock.version > 0, "Expected a live version from {rpc_url}");
}
