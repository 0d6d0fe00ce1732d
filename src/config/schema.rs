//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Node endpoint settings.
    pub node: NodeConfig,

    /// Submission retry settings.
    pub submit: SubmitConfig,

    /// Confirmation polling settings.
    pub confirm: ConfirmConfig,

    /// Defaults applied to every request.
    pub deploy: DeployConfig,

    /// Named contract hashes (e.g. `staking = "hash-..."`).
    pub contracts: BTreeMap<String, String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs (read-only queries only).
    pub failover_urls: Vec<String>,

    /// Network name the node must report (e.g. "casper-test").
    pub chain_name: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:7777/rpc".to_string(),
            failover_urls: Vec::new(),
            chain_name: "casper-test".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Submission retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmitConfig {
    /// Maximum number of submission attempts.
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Extra random delay as a fraction of `retry_delay_ms` (0.0 disables).
    pub jitter_ratio: f64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 3000,
            jitter_ratio: 0.0,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmConfig {
    /// Maximum number of outcome queries.
    pub max_polls: u32,

    /// Fixed delay between queries in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            max_polls: 300,
            poll_interval_ms: 1000,
        }
    }
}

/// Per-request defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Payment (resource budget) in motes when the operation has no default.
    pub payment_amount: u64,

    /// Time-to-live of a submitted request in milliseconds.
    pub ttl_ms: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            payment_amount: 10_000_000_000,
            ttl_ms: 1_800_000,
        }
    }
}

impl DeployConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Prometheus exporter bind address; exporter disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_address: None,
        }
    }
}
