use async_trait::async_trait;
use cosmwasm_std::{Binary, Coin, Event, Uint128};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::WalletSigner;

/// Ledger transport errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("transaction failed: {0}")]
    TxFailed(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LedgerError {
    /// Short label used for the `error_type` log field and metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            LedgerError::ConnectionFailed(_) => "connection",
            LedgerError::QueryFailed(_) => "query",
            LedgerError::TxFailed(_) => "tx",
            LedgerError::Timeout(_) => "timeout",
            LedgerError::EncodingError(_) => "encoding",
            LedgerError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Transaction response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub hash: String,
    pub height: u64,
    pub gas_used: u64,
    pub code: u32, // 0 for success
    pub raw_log: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl TxResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// First attribute `key` of the first event whose type ends with `ty`.
    ///
    /// Chains prefix contract events (`wasm-token_registered`), so matching
    /// is done on the suffix.
    pub fn event_attribute(&self, ty: &str, key: &str) -> Option<&str> {
        self.events
            .iter()
            .filter(|event| event.ty.ends_with(ty))
            .flat_map(|event| event.attributes.iter())
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

/// Client for the ledger hosting the distributor.
///
/// `execute_contract` resolves only once the transaction has been included;
/// a non-zero `code` in the response means the whole transaction reverted.
/// Timeouts and retries belong to the implementation.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Native coin balance of any address
    async fn query_native_balance(&self, address: &str, denom: &str)
        -> Result<Uint128, LedgerError>;

    /// Smart query against a contract
    async fn query_contract(&self, contract: &str, msg: Binary) -> Result<Binary, LedgerError>;

    /// Sign, broadcast and wait for inclusion of a contract call
    async fn execute_contract(
        &self,
        signer: &dyn WalletSigner,
        contract: &str,
        msg: Binary,
        funds: Vec<Coin>,
    ) -> Result<TxResponse, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(events: Vec<Event>) -> TxResponse {
        TxResponse {
            hash: "AB12".to_string(),
            height: 7,
            gas_used: 0,
            code: 0,
            raw_log: String::new(),
            events,
        }
    }

    #[test]
    fn test_event_attribute_matches_suffix() {
        let tx = response(vec![
            Event::new("wasm").add_attribute("action", "register_token"),
            Event::new("wasm-token_registered")
                .add_attribute("token_id", "4")
                .add_attribute("address", "cosmwasm1token"),
        ]);

        assert_eq!(tx.event_attribute("token_registered", "token_id"), Some("4"));
        assert_eq!(tx.event_attribute("token_registered", "missing"), None);
        assert_eq!(tx.event_attribute("transfer", "token_id"), None);
    }

    #[test]
    fn test_is_success() {
        let mut tx = response(vec![]);
        assert!(tx.is_success());

        tx.code = 5;
        assert!(!tx.is_success());
    }
}
