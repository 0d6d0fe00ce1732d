//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and that endpoint
//! URLs and contract hashes parse. All errors are collected, not just the
//! first one.

use std::fmt;

use crate::blockchain::args::ContractHash;
use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "node.rpc_url", &config.node.rpc_url);
    for (i, url) in config.node.failover_urls.iter().enumerate() {
        check_url(&mut errors, &format!("node.failover_urls[{}]", i), url);
    }
    if config.node.chain_name.trim().is_empty() {
        errors.push(ValidationError::new("node.chain_name", "must not be empty"));
    }
    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("node.rpc_timeout_secs", "must be greater than 0"));
    }

    if config.submit.max_attempts == 0 {
        errors.push(ValidationError::new("submit.max_attempts", "must be at least 1"));
    }
    if !(0.0..=1.0).contains(&config.submit.jitter_ratio) {
        errors.push(ValidationError::new("submit.jitter_ratio", "must be between 0.0 and 1.0"));
    }

    if config.confirm.max_polls == 0 {
        errors.push(ValidationError::new("confirm.max_polls", "must be at least 1"));
    }

    if config.deploy.payment_amount == 0 {
        errors.push(ValidationError::new("deploy.payment_amount", "must be greater than 0"));
    }
    if config.deploy.ttl_ms == 0 {
        errors.push(ValidationError::new("deploy.ttl_ms", "must be greater than 0"));
    }

    for (name, hash) in &config.contracts {
        if let Err(e) = hash.parse::<ContractHash>() {
            errors.push(ValidationError::new(format!("contracts.{}", name), e.to_string()));
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}
