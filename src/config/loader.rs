//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `node.rpc_url`.
pub const NODE_ADDRESS_ENV_VAR: &str = "RELAY_NODE_ADDRESS";
/// Overrides `node.chain_name`.
pub const CHAIN_NAME_ENV_VAR: &str = "RELAY_CHAIN_NAME";
/// Overrides `deploy.payment_amount`.
pub const PAYMENT_AMOUNT_ENV_VAR: &str = "RELAY_PAYMENT_AMOUNT";
/// Overrides `deploy.ttl_ms`.
pub const TTL_ENV_VAR: &str = "RELAY_TTL_MS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(NODE_ADDRESS_ENV_VAR) {
        config.node.rpc_url = url;
    }
    if let Some(name) = lookup(CHAIN_NAME_ENV_VAR) {
        config.node.chain_name = name;
    }
    if let Some(value) = lookup(PAYMENT_AMOUNT_ENV_VAR) {
        config.deploy.payment_amount = value.trim().parse().map_err(|_| ConfigError::Env {
            var: PAYMENT_AMOUNT_ENV_VAR,
            value,
        })?;
    }
    if let Some(value) = lookup(TTL_ENV_VAR) {
        config.deploy.ttl_ms = value.trim().parse().map_err(|_| ConfigError::Env {
            var: TTL_ENV_VAR,
            value,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [node]
            rpc_url = "http://node.example:7777/rpc"
            chain_name = "casper"

            [submit]
            max_attempts = 2
            "#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.node.chain_name, "casper");
        assert_eq!(config.submit.max_attempts, 2);
    }

    #[test]
    fn test_invalid_file_reports_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[confirm]\nmax_polls = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("confirm.max_polls"));
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[node\nrpc_url = 1").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RelayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (NODE_ADDRESS_ENV_VAR, "http://10.0.0.1:7777/rpc"),
                (CHAIN_NAME_ENV_VAR, "casper"),
                (PAYMENT_AMOUNT_ENV_VAR, "50000000000"),
                (TTL_ENV_VAR, "60000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.node.rpc_url, "http://10.0.0.1:7777/rpc");
        assert_eq!(config.node.chain_name, "casper");
        assert_eq!(config.deploy.payment_amount, 50_000_000_000);
        assert_eq!(config.deploy.ttl_ms, 60_000);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = RelayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(PAYMENT_AMOUNT_ENV_VAR, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(PAYMENT_AMOUNT_ENV_VAR));
    }
}
