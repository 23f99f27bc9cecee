//! JSON-RPC fullnode adapter.
//!
//! Implements [`LedgerClient`] over the fullnode's JSON-RPC 2.0 surface:
//! `suix_getAllCoins`, `sui_getObject`, `sui_devInspectTransactionBlock`,
//! `sui_dryRunTransactionBlock`, `sui_executeTransactionBlock`, and
//! `sui_getTransactionBlock` for the finality wait. Timeouts are whatever
//! the HTTP transport enforces; the only wait this adapter adds is the
//! bounded finality poll.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::domain::{
    Address, CoinRecord, CreatedObject, DryRunOutcome, ExecutionStatus, FeeSummary,
    InspectOutcome, ObjectId, TransactionEffects,
};
use crate::error::{Error, ExecutionError, Result};
use crate::tx::{TransactionData, TransactionKind};

use super::{LedgerClient, ObjectSnapshot, Signature, Signer, SubmitReceipt};

const FINALITY_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Two minutes at the poll interval; a checkpointed transaction is indexed
/// well within that.
const FINALITY_POLL_ATTEMPTS: u32 = 240;

/// Reqwest-backed JSON-RPC client for one fullnode endpoint.
pub struct JsonRpcLedger {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.get("error") {
            return Err(Error::Rpc(format!("{method}: {err}")));
        }
        let result = response
            .get("result")
            .cloned()
            .ok_or_else(|| Error::Rpc(format!("{method}: response has no result")))?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn query_holdings(&self, owner: &Address) -> Result<Vec<CoinRecord>> {
        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page: Value = self
                .call("suix_getAllCoins", json!([owner.as_str(), cursor]))
                .await?;
            if let Some(data) = page.get("data").and_then(Value::as_array) {
                for entry in data {
                    coins.push(serde_json::from_value(entry.clone())?);
                }
            }
            if page.get("hasNextPage").and_then(Value::as_bool) != Some(true) {
                break;
            }
            cursor = page
                .get("nextCursor")
                .and_then(Value::as_str)
                .map(str::to_string);
            if cursor.is_none() {
                break;
            }
        }
        Ok(coins)
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectSnapshot> {
        let response: Value = self
            .call(
                "sui_getObject",
                json!([id.as_str(), { "showContent": true, "showType": true }]),
            )
            .await?;
        let data = response
            .get("data")
            .ok_or_else(|| Error::Execution(ExecutionError::ObjectNotFound { id: id.clone() }))?;

        let version = match data.get("version") {
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| Error::Parse(format!("object {id} has malformed version")))?,
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| Error::Parse(format!("object {id} has malformed version")))?,
            _ => return Err(Error::Parse(format!("object {id} missing version"))),
        };
        let digest = data
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse(format!("object {id} missing digest")))?
            .to_string();

        Ok(ObjectSnapshot {
            object_id: id.clone(),
            version,
            digest,
            object_type: data
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
            content: data.pointer("/content/fields").cloned(),
        })
    }

    async fn inspect(&self, sender: &Address, kind: &TransactionKind) -> Result<InspectOutcome> {
        let response: Value = self
            .call(
                "sui_devInspectTransactionBlock",
                json!([sender.as_str(), kind]),
            )
            .await?;
        Ok(InspectOutcome {
            error: response
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string),
            effects: response.get("effects").map(effects_from_json).transpose()?,
        })
    }

    async fn dry_run(&self, data: &TransactionData) -> Result<DryRunOutcome> {
        let response: Value = self
            .call("sui_dryRunTransactionBlock", json!([data]))
            .await?;
        let effects = response
            .get("effects")
            .ok_or_else(|| Error::Rpc("dry run response has no effects".into()))?;
        Ok(DryRunOutcome {
            effects: effects_from_json(effects)?,
        })
    }

    async fn execute(
        &self,
        data: &TransactionData,
        signature: &Signature,
    ) -> Result<SubmitReceipt> {
        let response: Value = self
            .call(
                "sui_executeTransactionBlock",
                json!([data, [signature.0], { "showEffects": true }]),
            )
            .await?;
        let digest = response
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Execution(ExecutionError::SubmissionFailed(
                    "execute response has no digest".into(),
                ))
            })?
            .to_string();
        Ok(SubmitReceipt {
            digest,
            effects: response
                .get("effects")
                .map(effects_from_json)
                .transpose()?,
        })
    }

    async fn sign_and_execute(
        &self,
        data: &TransactionData,
        signer: &dyn Signer,
    ) -> Result<SubmitReceipt> {
        let signature = signer.sign(data).await?;
        self.execute(data, &signature).await
    }

    async fn await_finality(&self, digest: &str) -> Result<TransactionEffects> {
        // Poll until the fullnode reports the checkpointed transaction. Only
        // a not-yet-indexed reply is worth waiting on; any other error
        // propagates immediately, and the poll itself is bounded.
        for _ in 0..FINALITY_POLL_ATTEMPTS {
            let response: std::result::Result<Value, Error> = self
                .call(
                    "sui_getTransactionBlock",
                    json!([digest, { "showEffects": true }]),
                )
                .await;
            match response {
                Ok(value) => {
                    if let Some(effects) = value.get("effects") {
                        return effects_from_json(effects);
                    }
                    // Indexed but effects not attached yet; keep waiting.
                }
                Err(err) if is_not_yet_indexed(&err) => {}
                Err(other) => return Err(other),
            }
            tokio::time::sleep(FINALITY_POLL_INTERVAL).await;
        }
        Err(Error::Rpc(format!(
            "transaction {digest} not finalized after {FINALITY_POLL_ATTEMPTS} polls"
        )))
    }
}

/// Whether an RPC error means the digest is simply not indexed yet. The
/// fullnode reports that as a "Could not find" error; anything else (invalid
/// params, method not found, node refusing the query) is a real failure.
fn is_not_yet_indexed(err: &Error) -> bool {
    matches!(err, Error::Rpc(message) if message.contains("Could not find"))
}

/// Convert fullnode effects JSON into [`TransactionEffects`].
fn effects_from_json(effects: &Value) -> Result<TransactionEffects> {
    let status = match effects.pointer("/status/status").and_then(Value::as_str) {
        Some("success") => ExecutionStatus::Success,
        Some("failure") => ExecutionStatus::Failure {
            error: effects
                .pointer("/status/error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        },
        _ => ExecutionStatus::Unknown,
    };

    let created = effects
        .get("created")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let object_id = entry
                        .pointer("/reference/objectId")
                        .and_then(Value::as_str)?;
                    let owner = entry
                        .pointer("/owner/AddressOwner")
                        .and_then(Value::as_str)
                        .map(Address::from);
                    Some(CreatedObject {
                        object_id: ObjectId::from(object_id),
                        owner,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let mutated = effects
        .get("mutated")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .pointer("/reference/objectId")
                        .and_then(Value::as_str)
                        .map(ObjectId::from)
                })
                .collect()
        })
        .unwrap_or_default();

    let fee = effects.get("gasUsed").map(|gas| FeeSummary {
        computation_cost: gas_cost(gas, "computationCost"),
        storage_cost: gas_cost(gas, "storageCost"),
        storage_rebate: gas_cost(gas, "storageRebate"),
    });

    Ok(TransactionEffects {
        status,
        created,
        mutated,
        fee,
    })
}

fn gas_cost(gas: &Value, key: &str) -> u64 {
    match gas.get(key) {
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_parse_success_with_created_objects() {
        let effects = json!({
            "status": { "status": "success" },
            "created": [
                {
                    "reference": { "objectId": "0xcap" },
                    "owner": { "AddressOwner": "0xowner" }
                }
            ],
            "mutated": [
                { "reference": { "objectId": "0xmarket" } }
            ],
            "gasUsed": {
                "computationCost": "750000",
                "storageCost": "2000000",
                "storageRebate": "500000"
            }
        });

        let parsed = effects_from_json(&effects).unwrap();
        assert!(parsed.status.is_success());
        assert_eq!(parsed.created.len(), 1);
        assert_eq!(parsed.created[0].object_id.as_str(), "0xcap");
        assert_eq!(parsed.mutated[0].as_str(), "0xmarket");
        assert_eq!(parsed.fee.unwrap().net(), 2_250_000);
    }

    #[test]
    fn only_unindexed_digests_are_worth_polling_again() {
        let unindexed = Error::Rpc(
            "sui_getTransactionBlock: Could not find the referenced transaction [Dg1]".into(),
        );
        assert!(is_not_yet_indexed(&unindexed));

        let invalid_params = Error::Rpc("sui_getTransactionBlock: Invalid params".into());
        assert!(!is_not_yet_indexed(&invalid_params));

        let method_missing = Error::Rpc("sui_getTransactionBlock: Method not found".into());
        assert!(!is_not_yet_indexed(&method_missing));

        let parse = Error::Parse("object 0x1 missing digest".into());
        assert!(!is_not_yet_indexed(&parse));
    }

    #[test]
    fn effects_parse_failure_status() {
        let effects = json!({
            "status": { "status": "failure", "error": "MoveAbort(7)" }
        });
        let parsed = effects_from_json(&effects).unwrap();
        assert_eq!(
            parsed.status,
            ExecutionStatus::Failure {
                error: "MoveAbort(7)".into()
            }
        );
        assert!(parsed.created.is_empty());
    }
}
