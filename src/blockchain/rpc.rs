//! JSON-RPC transport for a signing gateway in front of a Casper node.
//!
//! # Responsibilities
//! - Send `account_put_deploy` to the primary endpoint
//! - Query `info_get_deploy` / `info_get_status` with failover
//! - Read contract named keys and dictionary items at the latest state root
//! - Enforce a deadline on every HTTP round trip
//! - Decode execution results into [`OutcomeStatus`]
//!
//! Submissions carry the unsigned envelope from
//! [`Request::to_envelope`](crate::blockchain::Request::to_envelope). A bare
//! node rejects it, so `rpc_url` must point at a gateway that signs and
//! forwards deploys. The read methods use the standard node RPC and work
//! against either.
//!
//! Submissions never fail over: a timed-out submission may still have
//! reached the primary, and sending it elsewhere would widen the
//! duplicate-execution window.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use crate::blockchain::args::ContractHash;
use crate::blockchain::transaction::Request;
use crate::blockchain::transport::LedgerTransport;
use crate::blockchain::types::{
    ConfirmationResult, NodeConfig, OutcomeStatus, Receipt, TransportError, TransportResult,
};
use crate::resilience::timeouts::with_timeout;

const METHOD_PUT_DEPLOY: &str = "account_put_deploy";
const METHOD_GET_DEPLOY: &str = "info_get_deploy";
const METHOD_GET_STATUS: &str = "info_get_status";
const METHOD_STATE_ROOT_HASH: &str = "chain_get_state_root_hash";
const METHOD_QUERY_GLOBAL_STATE: &str = "query_global_state";
const METHOD_DICTIONARY_ITEM: &str = "state_get_dictionary_item";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC transport with read failover.
#[derive(Clone)]
pub struct JsonRpcTransport {
    http: reqwest::Client,
    /// Primary first, then failovers.
    endpoints: Vec<Url>,
    chain_name: String,
    timeout_duration: Duration,
}

impl JsonRpcTransport {
    /// Create a transport from node configuration.
    ///
    /// The primary URL must parse; invalid failover URLs are skipped.
    pub fn new(config: &NodeConfig) -> TransportResult<Self> {
        let primary: Url = config.rpc_url.parse().map_err(|e| {
            TransportError::Http(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut endpoints = vec![primary];
        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            chain_name = %config.chain_name,
            "JSON-RPC transport initialized"
        );

        Ok(Self {
            http,
            endpoints,
            chain_name: config.chain_name.clone(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// One JSON-RPC round trip against `url`.
    async fn rpc(&self, url: &Url, method: &str, params: Value) -> TransportResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": Uuid::new_v4().to_string(),
            "method": method,
            "params": params,
        });

        with_timeout(self.timeout_duration, async {
            let response = self.http.post(url.clone()).json(&body).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Http(format!("{} returned status {}", url, status)));
            }

            let envelope: RpcResponse = response.json().await?;
            match (envelope.result, envelope.error) {
                (_, Some(err)) => Err(TransportError::Rpc {
                    code: err.code,
                    message: err.message,
                }),
                (Some(result), None) => Ok(result),
                (None, None) => Err(TransportError::Decode(
                    "response has neither result nor error".to_string(),
                )),
            }
        })
        .await
    }

    /// Read-only call, trying each endpoint in order.
    async fn query(&self, method: &str, params: Value) -> TransportResult<Value> {
        let mut last_error = String::new();
        for (i, url) in self.endpoints.iter().enumerate() {
            match self.rpc(url, method, params.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(endpoint_idx = i, method = method, error = %e, "RPC error, trying next endpoint");
                    last_error = e.to_string();
                }
            }
        }
        Err(TransportError::AllEndpointsFailed(last_error))
    }

    /// Chain name reported by the node.
    pub async fn node_chain_name(&self) -> TransportResult<String> {
        let status = self.query(METHOD_GET_STATUS, json!({})).await?;
        status["chainspec_name"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TransportError::Decode("missing chainspec_name".to_string()))
    }

    /// Verify the node serves the configured chain.
    pub async fn verify_chain_name(&self) -> TransportResult<()> {
        let actual = self.node_chain_name().await?;
        if actual != self.chain_name {
            return Err(TransportError::ChainMismatch {
                expected: self.chain_name.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// True if any endpoint answers a status query.
    pub async fn is_healthy(&self) -> bool {
        self.node_chain_name().await.is_ok()
    }

    /// Latest state root hash.
    pub async fn state_root_hash(&self) -> TransportResult<String> {
        let result = self.query(METHOD_STATE_ROOT_HASH, json!({})).await?;
        result["state_root_hash"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TransportError::Decode("missing state_root_hash".to_string()))
    }

    /// Value stored under the named key `name` of `contract`, such as
    /// `total_supply` or `decimals`.
    pub async fn named_key_value(
        &self,
        contract: &ContractHash,
        name: &str,
    ) -> TransportResult<Value> {
        let root = self.state_root_hash().await?;
        let params = json!({
            "state_identifier": { "StateRootHash": root },
            "key": contract.to_string(),
            "path": [name],
        });
        let result = self.query(METHOD_QUERY_GLOBAL_STATE, params).await?;
        tracing::debug!(contract = %contract, name = name, "Named key read");
        parse_stored_value(&result)
    }

    /// Item `item_key` of the dictionary `dictionary` owned by `contract`,
    /// such as an entry of `balances`.
    pub async fn dictionary_item(
        &self,
        contract: &ContractHash,
        dictionary: &str,
        item_key: &str,
    ) -> TransportResult<Value> {
        let root = self.state_root_hash().await?;
        let params = json!({
            "state_root_hash": root,
            "dictionary_identifier": {
                "ContractNamedKey": {
                    "key": contract.to_string(),
                    "dictionary_name": dictionary,
                    "dictionary_item_key": item_key,
                }
            }
        });
        let result = self.query(METHOD_DICTIONARY_ITEM, params).await?;
        tracing::debug!(
            contract = %contract,
            dictionary = dictionary,
            item_key = item_key,
            "Dictionary item read"
        );
        parse_stored_value(&result)
    }
}

#[async_trait]
impl LedgerTransport for JsonRpcTransport {
    async fn submit(&self, request: &Request) -> TransportResult<Receipt> {
        let params = json!({ "deploy": request.to_envelope(&self.chain_name) });
        let result = self.rpc(&self.endpoints[0], METHOD_PUT_DEPLOY, params).await?;
        result["deploy_hash"]
            .as_str()
            .map(Receipt::from)
            .ok_or_else(|| TransportError::Decode("missing deploy_hash".to_string()))
    }

    async fn get_outcome(&self, receipt: &Receipt) -> TransportResult<OutcomeStatus> {
        let result = self
            .query(METHOD_GET_DEPLOY, json!({ "deploy_hash": receipt.as_str() }))
            .await?;
        parse_outcome(&result)
    }
}

impl std::fmt::Debug for JsonRpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcTransport")
            .field("endpoints", &self.endpoints.len())
            .field("chain_name", &self.chain_name)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

/// Decode an `info_get_deploy` result.
///
/// Accepts the 1.x shape (`execution_results: [{result: {Success|Failure}}]`)
/// and the 2.x shape (`execution_info: {execution_result: {Version2: ..}}`).
pub fn parse_outcome(result: &Value) -> TransportResult<OutcomeStatus> {
    if let Some(results) = result.get("execution_results") {
        let results = results
            .as_array()
            .ok_or_else(|| TransportError::Decode("execution_results is not an array".into()))?;
        return match results.first() {
            None => Ok(OutcomeStatus::Pending),
            Some(first) => parse_v1_result(&first["result"]).map(OutcomeStatus::Executed),
        };
    }

    if let Some(info) = result.get("execution_info") {
        if info.is_null() {
            return Ok(OutcomeStatus::Pending);
        }
        let exec = &info["execution_result"];
        if exec.is_null() {
            return Ok(OutcomeStatus::Pending);
        }
        if let Some(v2) = exec.get("Version2") {
            return Ok(OutcomeStatus::Executed(match v2["error_message"].as_str() {
                Some(message) => ConfirmationResult::Failure(message.to_string()),
                None => ConfirmationResult::Success(v2.clone()),
            }));
        }
        if let Some(v1) = exec.get("Version1") {
            return parse_v1_result(v1).map(OutcomeStatus::Executed);
        }
        return Err(TransportError::Decode("unknown execution_result version".into()));
    }

    Err(TransportError::Decode(
        "neither execution_results nor execution_info present".into(),
    ))
}

/// Extract the value from a state query result.
///
/// CL values yield their `parsed` form; other stored values (accounts,
/// contracts) are returned whole.
pub fn parse_stored_value(result: &Value) -> TransportResult<Value> {
    let stored = result
        .get("stored_value")
        .ok_or_else(|| TransportError::Decode("missing stored_value".into()))?;
    match stored.get("CLValue") {
        Some(cl_value) => cl_value
            .get("parsed")
            .cloned()
            .ok_or_else(|| TransportError::Decode("CLValue without parsed form".into())),
        None => Ok(stored.clone()),
    }
}

fn parse_v1_result(result: &Value) -> TransportResult<ConfirmationResult> {
    if let Some(success) = result.get("Success") {
        return Ok(ConfirmationResult::Success(success.clone()));
    }
    if let Some(failure) = result.get("Failure") {
        let message = failure["error_message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        return Ok(ConfirmationResult::Failure(message));
    }
    Err(TransportError::Decode("execution result is neither Success nor Failure".into()))
}
