use std::sync::Arc;

use async_trait::async_trait;
use batch_distributor_types::WalletRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("unknown wallet: {0}")]
    UnknownWallet(WalletRef),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("key provider unavailable: {0}")]
    Unavailable(String),
}

/// Capability to sign transactions for one wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// On-ledger address of the wallet
    fn address(&self) -> &str;

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError>;
}

/// Key-management service resolving wallet references to signers
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn signer(&self, wallet: &WalletRef) -> Result<Arc<dyn WalletSigner>, KeyError>;

    /// Address of a wallet without keeping its signer around
    async fn address(&self, wallet: &WalletRef) -> Result<String, KeyError> {
        Ok(self.signer(wallet).await?.address().to_string())
    }
}
