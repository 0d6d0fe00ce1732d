//! JSON-RPC transport against a local mock node.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use ledger_relay::blockchain::{
    ConfirmationResult, ContractHash, JsonRpcTransport, LedgerTransport, NamedArg,
    OutcomeStatus, Receipt, Relay, RelayError, Request, TransportError,
};
use ledger_relay::config::{DeployConfig, NodeConfig};
use ledger_relay::resilience::{PollPolicy, SubmitPolicy};

mod common;
use common::{sample_request, start_mock_node, RecordingSleeper};

const DEAD_ENDPOINT: &str = "http://127.0.0.1:1/rpc";

fn node_config(rpc_url: String) -> NodeConfig {
    NodeConfig {
        rpc_url,
        rpc_timeout_secs: 2,
        ..NodeConfig::default()
    }
}

fn v1_success() -> Value {
    json!({ "deploy": {}, "execution_results": [
        { "block_hash": "aa", "result": { "Success": { "cost": "100" } } }
    ]})
}

#[tokio::test]
async fn test_submit_sends_envelope() {
    let seen = Arc::new(Mutex::new(Value::Null));
    let seen_in_node = seen.clone();
    let addr = start_mock_node(move |method, params| {
        assert_eq!(method, "account_put_deploy");
        *seen_in_node.lock().unwrap() = params.clone();
        Ok(json!({ "api_version": "1.5.6", "deploy_hash": "deploy-hash-abc" }))
    })
    .await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let receipt = transport.submit(&sample_request()).await.unwrap();

    assert_eq!(receipt, Receipt::from("deploy-hash-abc"));
    let params = seen.lock().unwrap().clone();
    let deploy = &params["deploy"];
    assert_eq!(deploy["chain_name"], "casper-test");
    assert_eq!(deploy["session"]["StoredContractByHash"]["entry_point"], "stake");
    assert_eq!(deploy["session"]["StoredContractByHash"]["args"][0][0], "pool_id");
}

#[tokio::test]
async fn test_rpc_error_object_is_surfaced() {
    let addr = start_mock_node(|_, _| Err((-32008, "invalid deploy".to_string()))).await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let err = transport.submit(&sample_request()).await.unwrap_err();

    match err {
        TransportError::Rpc { code, message } => {
            assert_eq!(code, -32008);
            assert_eq!(message, "invalid deploy");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_deploy_hash_is_decode_error() {
    let addr = start_mock_node(|_, _| Ok(json!({ "api_version": "1.5.6" }))).await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let err = transport.submit(&sample_request()).await.unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn test_get_outcome_decodes_results() {
    let addr = start_mock_node(|method, params| {
        assert_eq!(method, "info_get_deploy");
        match params["deploy_hash"].as_str() {
            Some("pending") => Ok(json!({ "deploy": {}, "execution_results": [] })),
            Some("failed") => Ok(json!({ "execution_results": [
                { "result": { "Failure": { "error_message": "User error: 65" } } }
            ]})),
            _ => Ok(v1_success()),
        }
    })
    .await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();

    assert_eq!(
        transport.get_outcome(&Receipt::from("pending")).await.unwrap(),
        OutcomeStatus::Pending
    );
    assert_eq!(
        transport.get_outcome(&Receipt::from("failed")).await.unwrap(),
        OutcomeStatus::Executed(ConfirmationResult::Failure("User error: 65".into()))
    );
    assert_eq!(
        transport.get_outcome(&Receipt::from("done")).await.unwrap(),
        OutcomeStatus::Executed(ConfirmationResult::Success(json!({ "cost": "100" })))
    );
}

#[tokio::test]
async fn test_queries_fail_over_but_submissions_do_not() {
    let addr = start_mock_node(|method, _| match method {
        "info_get_deploy" => Ok(v1_success()),
        _ => Ok(json!({ "deploy_hash": "should-not-reach" })),
    })
    .await;

    let config = NodeConfig {
        failover_urls: vec![format!("http://{addr}/rpc")],
        ..node_config(DEAD_ENDPOINT.to_string())
    };
    let transport = JsonRpcTransport::new(&config).unwrap();

    let outcome = transport.get_outcome(&Receipt::from("abc")).await.unwrap();
    assert!(matches!(outcome, OutcomeStatus::Executed(ConfirmationResult::Success(_))));

    let err = transport.submit(&sample_request()).await.unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
}

#[tokio::test]
async fn test_all_endpoints_down() {
    let config = NodeConfig {
        failover_urls: vec!["http://127.0.0.1:2/rpc".to_string()],
        ..node_config(DEAD_ENDPOINT.to_string())
    };
    let transport = JsonRpcTransport::new(&config).unwrap();

    let err = transport.get_outcome(&Receipt::from("abc")).await.unwrap_err();
    assert!(matches!(err, TransportError::AllEndpointsFailed(_)));
    assert!(!transport.is_healthy().await);
}

#[tokio::test]
async fn test_verify_chain_name() {
    let addr = start_mock_node(|method, _| {
        assert_eq!(method, "info_get_status");
        Ok(json!({ "chainspec_name": "casper-test", "api_version": "1.5.6" }))
    })
    .await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    transport.verify_chain_name().await.unwrap();
    assert!(transport.is_healthy().await);

    let config = NodeConfig {
        chain_name: "casper".to_string(),
        ..node_config(format!("http://{addr}/rpc"))
    };
    let transport = JsonRpcTransport::new(&config).unwrap();
    let err = transport.verify_chain_name().await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::ChainMismatch { ref expected, ref actual }
            if expected == "casper" && actual == "casper-test"
    ));
}

#[tokio::test]
async fn test_relay_end_to_end_over_http() {
    let submits = Arc::new(AtomicU32::new(0));
    let polls = Arc::new(AtomicU32::new(0));
    let (submits_in_node, polls_in_node) = (submits.clone(), polls.clone());

    let addr = start_mock_node(move |method, _| match method {
        "account_put_deploy" => {
            if submits_in_node.fetch_add(1, Ordering::SeqCst) == 0 {
                Err((-32603, "node busy".to_string()))
            } else {
                Ok(json!({ "deploy_hash": "deploy-hash-abc" }))
            }
        }
        "info_get_deploy" => {
            if polls_in_node.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(json!({ "deploy": {}, "execution_results": [] }))
            } else {
                Ok(v1_success())
            }
        }
        other => Err((-32601, format!("unknown method {other}"))),
    })
    .await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());
    let relay = Relay::new(Arc::new(transport))
        .with_sleeper(sleeper.clone())
        .with_submit_policy(SubmitPolicy::default().with_max_attempts(5))
        .with_poll_policy(PollPolicy::new(3, Duration::from_secs(1)));

    let execution = relay.execute(&sample_request()).await.unwrap();

    assert_eq!(execution.receipt, Receipt::from("deploy-hash-abc"));
    assert_eq!(execution.payload, json!({ "cost": "100" }));
    assert_eq!(submits.load(Ordering::SeqCst), 2);
    assert_eq!(polls.load(Ordering::SeqCst), 3);
    assert_eq!(
        sleeper.waits(),
        vec![Duration::from_secs(3), Duration::from_secs(1), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_relay_times_out_against_stuck_node() {
    let addr = start_mock_node(|_, _| Ok(json!({ "deploy": {}, "execution_results": [] }))).await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let relay = Relay::new(Arc::new(transport))
        .with_sleeper(Arc::new(RecordingSleeper::default()))
        .with_poll_policy(PollPolicy::new(4, Duration::from_secs(1)));

    let err = relay.confirm(&Receipt::from("abc")).await.unwrap_err();
    assert!(matches!(err, RelayError::Timeout { polls: 4, .. }));
}

const NOTE: &str = "hash-a1ad933de2a21ee72360653340f2868a71f11bc4173aa865d5cc8bbc2ade34d6";
const STATE_ROOT: &str = "3d1f4c2bd54e1c6fc1a1ea0e2ea0bd1e33c4d9ff0f1d3b3c2b1a0f9e8d7c6b5a";

fn state_node(method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "chain_get_state_root_hash" => Ok(json!({ "state_root_hash": STATE_ROOT })),
        "query_global_state" => {
            assert_eq!(params["state_identifier"]["StateRootHash"], STATE_ROOT);
            assert_eq!(params["key"], NOTE);
            match params["path"][0].as_str() {
                Some("total_supply") => Ok(json!({ "stored_value": { "CLValue": {
                    "cl_type": "U256", "bytes": "0400ca9a3b", "parsed": "1000000000"
                }}})),
                _ => Err((-32003, "Query failed: ValueNotFound".to_string())),
            }
        }
        "state_get_dictionary_item" => {
            assert_eq!(params["state_root_hash"], STATE_ROOT);
            let id = &params["dictionary_identifier"]["ContractNamedKey"];
            assert_eq!(id["key"], NOTE);
            assert_eq!(id["dictionary_name"], "balances");
            Ok(json!({ "dictionary_key": "dictionary-00", "stored_value": { "CLValue": {
                "cl_type": "U256", "bytes": "0164", "parsed": id["dictionary_item_key"]
            }}}))
        }
        other => Err((-32601, format!("unknown method {other}"))),
    }
}

#[tokio::test]
async fn test_named_key_read() {
    let addr = start_mock_node(state_node).await;
    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let note: ContractHash = NOTE.parse().unwrap();

    assert_eq!(transport.state_root_hash().await.unwrap(), STATE_ROOT);
    assert_eq!(
        transport.named_key_value(&note, "total_supply").await.unwrap(),
        json!("1000000000")
    );

    let err = transport.named_key_value(&note, "missing").await.unwrap_err();
    assert!(matches!(err, TransportError::AllEndpointsFailed(ref m) if m.contains("ValueNotFound")));
}

#[tokio::test]
async fn test_dictionary_item_read() {
    let addr = start_mock_node(state_node).await;
    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let note: ContractHash = NOTE.parse().unwrap();

    let value = transport
        .dictionary_item(&note, "balances", "owner-item-key")
        .await
        .unwrap();
    assert_eq!(value, json!("owner-item-key"));
}

#[tokio::test]
async fn test_state_read_without_state_root() {
    let addr = start_mock_node(|_, _| Ok(json!({ "api_version": "1.5.6" }))).await;
    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let note: ContractHash = NOTE.parse().unwrap();

    let err = transport.named_key_value(&note, "total_supply").await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn test_install_submits_module_bytes() {
    let seen = Arc::new(Mutex::new(Value::Null));
    let seen_in_node = seen.clone();
    let addr = start_mock_node(move |method, params| match method {
        "account_put_deploy" => {
            *seen_in_node.lock().unwrap() = params["deploy"].clone();
            Ok(json!({ "deploy_hash": "install-hash" }))
        }
        _ => Ok(v1_success()),
    })
    .await;

    let transport = JsonRpcTransport::new(&node_config(format!("http://{addr}/rpc"))).unwrap();
    let relay = Relay::new(Arc::new(transport)).with_sleeper(Arc::new(RecordingSleeper::default()));

    let decimals: NamedArg = "decimals:u8=9".parse().unwrap();
    let request = Request::install(vec![0x00, 0x61, 0x73, 0x6d, 0x01])
        .arg("name", "NOTE-TOKEN")
        .arg(decimals.name, decimals.value)
        .build(&DeployConfig::default());

    let execution = relay.execute(&request).await.unwrap();
    assert_eq!(execution.receipt, Receipt::from("install-hash"));

    let deploy = seen.lock().unwrap().clone();
    assert_eq!(deploy["payment"], "200000000000");
    let session = &deploy["session"]["ModuleBytes"];
    assert_eq!(session["module_bytes"], "0061736d01");
    assert_eq!(session["args"][1][0], "decimals");
    assert_eq!(session["args"][1][1]["parsed"], 9);
}
