//! Configuration validation

use crate::{AppConfig, ConfigError, LedgerConfig, Result};

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Validate network config
    if let Err(e) = validate_log_level(&config.network.log_level) {
        errors.push(e);
    }

    // Validate ledger config
    for (field, message) in validate_ledger_config(&config.ledger) {
        errors.push(ValidationError::new(format!("ledger.{field}"), message));
    }

    // Validate distributor config
    if config.distributor.contract_address.is_empty() {
        errors.push(ValidationError::new(
            "distributor.contract_address",
            "contract address is required",
        ));
    } else if !config
        .distributor
        .contract_address
        .starts_with(&config.ledger.address_prefix)
    {
        errors.push(ValidationError::new(
            "distributor.contract_address",
            format!(
                "address must use the '{}' prefix",
                config.ledger.address_prefix
            ),
        ));
    }

    if config.distributor.max_batch_size == 0 {
        errors.push(ValidationError::new(
            "distributor.max_batch_size",
            "must be greater than 0",
        ));
    }

    // Return all errors if any were found
    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// Validate a ledger configuration, returning every `(field, message)` problem
pub fn validate_ledger_config(ledger: &LedgerConfig) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();

    if ledger.chain_id.is_empty() {
        problems.push(("chain_id", "chain_id is required".to_string()));
    }

    if let Err(e) = validate_url(&ledger.rpc_url) {
        problems.push(("rpc_url", e));
    }

    if ledger.native_denom.is_empty() {
        problems.push(("native_denom", "native_denom is required".to_string()));
    }

    if ledger.address_prefix.is_empty() {
        problems.push(("address_prefix", "address_prefix is required".to_string()));
    }

    if ledger.timeout_ms == 0 {
        problems.push(("timeout_ms", "timeout_ms must be greater than 0".to_string()));
    }

    problems
}

/// Validate a URL
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://")
        && !url.starts_with("https://")
        && !url.starts_with("ws://")
        && !url.starts_with("wss://")
    {
        return Err("URL must start with http://, https://, ws://, or wss://".to_string());
    }

    Ok(())
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "network.log_level",
            format!(
                "invalid log level '{level}', must be one of: trace, debug, info, warn, error"
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistributorConfig, NetworkConfig};

    fn valid_config() -> AppConfig {
        AppConfig {
            ledger: LedgerConfig {
                chain_id: "cosmoshub-4".to_string(),
                rpc_url: "https://rpc.cosmos.network".to_string(),
                ..Default::default()
            },
            distributor: DistributorConfig {
                contract_address: "cosmos1distributor".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_local_defaults_need_contract() {
        let err = validate_config(&AppConfig::local()).unwrap_err();
        assert!(err.to_string().contains("distributor.contract_address"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = AppConfig {
            network: NetworkConfig {
                log_level: "invalid".to_string(),
                ..Default::default()
            },
            ..valid_config()
        };

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = valid_config();
        config.ledger.rpc_url = "localhost:26657".to_string();
        config.distributor.max_batch_size = 0;
        config.distributor.contract_address = "osmo1distributor".to_string();

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("ledger.rpc_url"));
        assert!(msg.contains("distributor.max_batch_size"));
        assert!(msg.contains("'cosmos' prefix"));
    }

    #[test]
    fn test_validate_ledger_config() {
        let ledger = LedgerConfig {
            chain_id: "cosmoshub-4".to_string(),
            rpc_url: "https://rpc.cosmos.network".to_string(),
            ..Default::default()
        };
        assert!(validate_ledger_config(&ledger).is_empty());

        let invalid = LedgerConfig {
            chain_id: String::new(),
            timeout_ms: 0,
            ..ledger
        };
        let fields: Vec<_> = validate_ledger_config(&invalid)
            .into_iter()
            .map(|(field, _)| field)
            .collect();
        assert_eq!(fields, vec!["chain_id", "timeout_ms"]);
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:26657").is_ok());
        assert!(validate_url("wss://example.com").is_ok());

        assert!(validate_url("").is_err());
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }
}
