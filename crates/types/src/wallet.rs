use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Cosmos coin type registered in SLIP-44
pub const COSMOS_COIN_TYPE: u32 = 118;

/// Hierarchical reference to a wallet held by the key-management provider.
///
/// The reference is never visible on the ledger; it is resolved to an
/// address and a signing capability off-ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletRef {
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub index: u32,
}

impl WalletRef {
    pub fn new(coin_type: u32, account: u32, change: u32, index: u32) -> Self {
        Self {
            coin_type,
            account,
            change,
            index,
        }
    }

    /// Wallet on the Cosmos coin type, external chain, account 0
    pub fn cosmos(index: u32) -> Self {
        Self::new(COSMOS_COIN_TYPE, 0, 0, index)
    }

    /// BIP-44 style derivation path, e.g. `m/44'/118'/0'/0/3`
    pub fn derivation_path(&self) -> String {
        format!(
            "m/44'/{}'/{}'/{}/{}",
            self.coin_type, self.account, self.change, self.index
        )
    }
}

impl Default for WalletRef {
    fn default() -> Self {
        Self::cosmos(0)
    }
}

impl fmt::Display for WalletRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.derivation_path())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletRefParseError {
    #[error("derivation path must start with m/44': {0}")]
    BadPrefix(String),

    #[error("derivation path must have 5 components: {0}")]
    WrongLength(String),

    #[error("invalid path component '{component}' in {path}")]
    BadComponent { path: String, component: String },
}

impl FromStr for WalletRef {
    type Err = WalletRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("m/44'/")
            .ok_or_else(|| WalletRefParseError::BadPrefix(s.to_string()))?;

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 4 {
            return Err(WalletRefParseError::WrongLength(s.to_string()));
        }

        let parse = |component: &str, hardened: bool| -> Result<u32, WalletRefParseError> {
            let digits = if hardened {
                component.strip_suffix('\'')
            } else {
                Some(component)
            };
            digits
                .and_then(|d| d.parse().ok())
                .ok_or_else(|| WalletRefParseError::BadComponent {
                    path: s.to_string(),
                    component: component.to_string(),
                })
        };

        Ok(Self {
            coin_type: parse(parts[0], true)?,
            account: parse(parts[1], true)?,
            change: parse(parts[2], false)?,
            index: parse(parts[3], false)?,
        })
    }
}
