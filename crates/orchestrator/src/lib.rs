pub mod client;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod mock;
pub mod orchestrator;
pub mod validator;


// Re-export main types
pub use client::DistributorClient;
pub use error::{BuilderError, OrchestratorError};
pub use keys::{KeyError, KeyProvider, WalletSigner};
pub use ledger::{LedgerClient, LedgerError, TxResponse};
pub use mock::{MockKeyProvider, MockLedger, MockSigner, RecordedTx};
pub use orchestrator::{BatchOrchestrator, BatchOrchestratorBuilder, OrchestratorConfig};
pub use validator::InvoiceValidator;
