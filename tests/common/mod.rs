//! Shared fakes for relay and transport tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use ledger_relay::blockchain::types::TransportResult;
use ledger_relay::blockchain::{
    ContractHash, LedgerTransport, OutcomeStatus, Receipt, Request, TransportError,
};
use ledger_relay::config::DeployConfig;
use ledger_relay::resilience::Sleeper;

/// Transport replaying scripted responses. An empty submit script fails;
/// an empty outcome script reports pending.
#[derive(Default)]
pub struct ScriptedTransport {
    submits: Mutex<VecDeque<TransportResult<Receipt>>>,
    outcomes: Mutex<VecDeque<TransportResult<OutcomeStatus>>>,
    submit_calls: AtomicU32,
    outcome_calls: AtomicU32,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submits(self, script: Vec<TransportResult<Receipt>>) -> Self {
        *self.submits.lock().unwrap() = script.into();
        self
    }

    pub fn with_outcomes(self, script: Vec<TransportResult<OutcomeStatus>>) -> Self {
        *self.outcomes.lock().unwrap() = script.into();
        self
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn outcome_calls(&self) -> u32 {
        self.outcome_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerTransport for ScriptedTransport {
    async fn submit(&self, _request: &Request) -> TransportResult<Receipt> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Http("connection refused".into())))
    }

    async fn get_outcome(&self, _receipt: &Receipt) -> TransportResult<OutcomeStatus> {
        self.outcome_calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(OutcomeStatus::Pending))
    }
}

/// Sleeper that returns immediately and records what it was asked to wait.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.waits().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

#[allow(dead_code)]
pub fn sample_request() -> Request {
    let contract: ContractHash = "hash-7faeeb6f5facec8d4dc79a7d313215e1cd53ea878ff8d2100176ee703e8a237c"
        .parse()
        .unwrap();
    Request::builder(contract, "stake")
        .arg("pool_id", 0u64)
        .build(&DeployConfig::default())
}

/// Start a JSON-RPC node on an ephemeral port. `f` maps `(method, params)`
/// to either `Ok(result)` or `Err((code, message))`.
#[allow(dead_code)]
pub async fn start_mock_node<F>(f: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let app = Router::new().route(
        "/rpc",
        post(move |Json(body): Json<Value>| {
            let f = f.clone();
            async move {
                let method = body["method"].as_str().unwrap_or_default().to_string();
                let response = match f(&method, &body["params"]) {
                    Ok(result) => json!({ "jsonrpc": "2.0", "id": body["id"], "result": result }),
                    Err((code, message)) => json!({
                        "jsonrpc": "2.0",
                        "id": body["id"],
                        "error": { "code": code, "message": message }
                    }),
                };
                Json(response)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
