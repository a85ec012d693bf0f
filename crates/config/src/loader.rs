//! Configuration loading from multiple sources

use crate::{AppConfig, ConfigError, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "BATCH_DISTRIBUTOR";

/// Configuration loader with support for multiple formats and sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    ///
    /// Supports TOML, YAML, and JSON formats based on file extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), format = extension, "loading config file");

        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<AppConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from environment variables
    ///
    /// Uses default prefix "BATCH_DISTRIBUTOR"
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with custom prefix
    ///
    /// Sections and keys are separated by a double underscore, for example
    /// `BATCH_DISTRIBUTOR_DISTRIBUTOR__MAX_BATCH_SIZE=50`
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        let config = Config::builder().add_source(env_source(prefix)).build()?;

        config.try_deserialize().map_err(ConfigError::from)
    }

    /// Merge two configurations, with overlay sections taking precedence
    pub fn merge(base: AppConfig, overlay: AppConfig) -> AppConfig {
        let distributor = if overlay.distributor.contract_address.is_empty() {
            base.distributor
        } else {
            overlay.distributor
        };
        let ledger = if overlay.ledger.rpc_url.is_empty() {
            base.ledger
        } else {
            overlay.ledger
        };

        AppConfig {
            network: overlay.network,
            ledger,
            distributor,
        }
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Individual keys set in the environment replace the same keys from
    /// the file; everything else comes from the file.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        Self::builder()
            .add_file(path, true)
            .add_env(env_prefix)
            .build()
    }

    /// Build configuration using the config crate's builder pattern
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
        }
    }
}

fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Builder for complex configuration loading scenarios
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl ConfigLoaderBuilder {
    /// Add a configuration file source
    pub fn add_file(mut self, path: &Path, required: bool) -> Self {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(env_source(prefix));
        self
    }

    /// Set a default value for a key
    pub fn set_default(mut self, key: &str, value: &str) -> Result<Self> {
        self.builder = self.builder.set_default(key, value)?;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistributorConfig, Environment as NetEnv, LedgerConfig, NetworkConfig};
    use batch_distributor_types::WalletRef;
    use std::io::Write;

    const TOML: &str = r#"
        [network]
        environment = "testnet"
        log_level = "debug"
        metrics_enabled = true

        [ledger]
        chain_id = "theta-testnet-001"
        rpc_url = "https://rpc.testnet.example.com"
        native_denom = "uatom"
        address_prefix = "cosmos"
        timeout_ms = 15000

        [distributor]
        contract_address = "cosmos1distributor"
        max_batch_size = 50

        [distributor.owner_wallet]
        coin_type = 118
        account = 0
        change = 0
        index = 2
    "#;

    #[test]
    fn test_load_from_toml() {
        let config = ConfigLoader::from_toml(TOML).unwrap();
        assert_eq!(config.network.log_level, "debug");
        assert_eq!(config.network.environment, NetEnv::Testnet);
        assert_eq!(config.ledger.timeout_ms, 15000);
        assert_eq!(config.distributor.max_batch_size, 50);
        assert_eq!(config.distributor.owner_wallet, WalletRef::cosmos(2));
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
network:
  environment: testnet
  log_level: debug

ledger:
  chain_id: theta-testnet-001
  rpc_url: "https://rpc.testnet.example.com"

distributor:
  contract_address: "cosmos1distributor"
  owner_wallet:
    coin_type: 118
    account: 1
    change: 0
    index: 0
        "#;

        let config = ConfigLoader::from_yaml(yaml).unwrap();
        assert_eq!(config.network.log_level, "debug");
        assert_eq!(config.ledger.native_denom, "uatom");
        assert_eq!(config.distributor.owner_wallet.account, 1);
        assert_eq!(config.distributor.max_batch_size, 200);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"
{
  "network": {
    "environment": "mainnet",
    "log_level": "warn",
    "metrics_enabled": true
  },
  "ledger": {
    "chain_id": "cosmoshub-4",
    "rpc_url": "https://rpc.cosmos.network",
    "native_denom": "uatom"
  },
  "distributor": {
    "contract_address": "cosmos1distributor",
    "max_batch_size": 100
  }
}
        "#;

        let config = ConfigLoader::from_json(json).unwrap();
        assert_eq!(config.network.environment, NetEnv::Mainnet);
        assert_eq!(config.ledger.chain_id, "cosmoshub-4");
        assert_eq!(config.distributor.owner_wallet, WalletRef::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(TOML.as_bytes()).unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.distributor.contract_address, "cosmos1distributor");
    }

    #[test]
    fn test_load_from_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new()
            .suffix(".ini")
            .tempfile()
            .unwrap();

        let err = ConfigLoader::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn test_env_overrides_single_key() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(TOML.as_bytes()).unwrap();

        // Unique prefix keeps this test isolated from the rest of the process
        std::env::set_var("BD_LOADER_TEST_DISTRIBUTOR__MAX_BATCH_SIZE", "7");
        let config = ConfigLoader::from_file_with_env(file.path(), "BD_LOADER_TEST").unwrap();
        std::env::remove_var("BD_LOADER_TEST_DISTRIBUTOR__MAX_BATCH_SIZE");

        assert_eq!(config.distributor.max_batch_size, 7);
        assert_eq!(config.distributor.contract_address, "cosmos1distributor");
        assert_eq!(config.ledger.timeout_ms, 15000);
    }

    #[test]
    fn test_merge_configs() {
        let base = AppConfig {
            network: NetworkConfig {
                environment: NetEnv::Local,
                log_level: "info".to_string(),
                metrics_enabled: true,
            },
            ledger: LedgerConfig {
                rpc_url: "http://localhost:26657".to_string(),
                ..Default::default()
            },
            distributor: DistributorConfig {
                contract_address: "cosmos1base".to_string(),
                ..Default::default()
            },
        };

        let overlay = AppConfig {
            network: NetworkConfig {
                environment: NetEnv::Testnet,
                log_level: "debug".to_string(),
                metrics_enabled: true,
            },
            ..Default::default()
        };

        let merged = ConfigLoader::merge(base, overlay);
        assert_eq!(merged.network.log_level, "debug");
        assert_eq!(merged.network.environment, NetEnv::Testnet);
        assert_eq!(merged.ledger.rpc_url, "http://localhost:26657");
        assert_eq!(merged.distributor.contract_address, "cosmos1base");
    }
}
