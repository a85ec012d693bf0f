//! Core configuration structures for the batch distributor

use batch_distributor_types::WalletRef;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Ledger endpoint configuration
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Distributor contract configuration
    #[serde(default)]
    pub distributor: DistributorConfig,
}

/// Network environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Environment type (mainnet, testnet, local)
    pub environment: Environment,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable metrics collection
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Mainnet,
    Testnet,
    Local,
}

/// Ledger endpoint the orchestrator talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Chain identifier
    pub chain_id: String,

    /// RPC endpoint URL
    pub rpc_url: String,

    /// Denomination of the native coin paid out by native batches
    #[serde(default = "default_native_denom")]
    pub native_denom: String,

    /// Address prefix (e.g., "cosmos")
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Distributor contract and owner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Address of the deployed distributor contract
    pub contract_address: String,

    /// Wallet that owns the distributor and signs batches
    #[serde(default)]
    pub owner_wallet: WalletRef,

    /// Largest batch the orchestrator will submit
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_native_denom() -> String {
    "uatom".to_string()
}

fn default_address_prefix() -> String {
    "cosmos".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_max_batch_size() -> usize {
    200
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            log_level: default_log_level(),
            metrics_enabled: default_true(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: String::new(),
            rpc_url: String::new(),
            native_denom: default_native_denom(),
            address_prefix: default_address_prefix(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            owner_wallet: WalletRef::default(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl AppConfig {
    /// Local development defaults pointing at a single-node chain
    pub fn local() -> Self {
        Self {
            network: NetworkConfig {
                environment: Environment::Local,
                log_level: "debug".to_string(),
                metrics_enabled: false,
            },
            ledger: LedgerConfig {
                chain_id: "localnet-1".to_string(),
                rpc_url: "http://localhost:26657".to_string(),
                ..Default::default()
            },
            distributor: DistributorConfig::default(),
        }
    }
}
