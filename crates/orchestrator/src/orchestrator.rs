use std::sync::Arc;
use std::time::{Duration, Instant};

use batch_distributor_config::AppConfig;
use batch_distributor_metrics::{BatchSpan, MetricsCollector, RejectReason};
use batch_distributor_types::{
    checked_total, BatchKind, NativeInvoice, SendingTokenInvoice, TokenInvoice, ValidationError,
    WalletRef,
};
use cosmwasm_std::{coins, Uint128};
use futures::future::try_join_all;
use tracing::{debug, error, info, warn, Instrument};

use crate::client::{DistributorClient, DEFAULT_LEDGER_TIMEOUT};
use crate::error::{BuilderError, OrchestratorError};
use crate::keys::{KeyProvider, WalletSigner};
use crate::ledger::{LedgerClient, LedgerError, TxResponse};
use crate::validator::InvoiceValidator;

/// Configuration for the orchestrator
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Address of the distributor contract
    pub contract_address: String,

    /// Denomination paid out by native batches
    pub native_denom: String,

    /// Maximum invoices per batch
    pub max_batch_size: usize,

    /// Bound on each ledger query or transaction
    pub ledger_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            native_denom: "uatom".to_string(),
            max_batch_size: 200,
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
        }
    }
}

impl From<&AppConfig> for OrchestratorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            contract_address: config.distributor.contract_address.clone(),
            native_denom: config.ledger.native_denom.clone(),
            max_batch_size: config.distributor.max_batch_size,
            ledger_timeout: Duration::from_millis(config.ledger.timeout_ms),
        }
    }
}

/// Builder for BatchOrchestrator
pub struct BatchOrchestratorBuilder {
    ledger: Option<Arc<dyn LedgerClient>>,
    metrics: Option<Arc<MetricsCollector>>,
    config: OrchestratorConfig,
}

impl BatchOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            ledger: None,
            metrics: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// Set the ledger transport
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Share a metrics collector instead of creating one
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the orchestrator configuration
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the BatchOrchestrator, validating that all required fields are set
    pub fn build(self) -> Result<BatchOrchestrator, BuilderError> {
        let ledger = self.ledger.ok_or_else(|| BuilderError::MissingField {
            field: "ledger".to_string(),
        })?;

        if self.config.contract_address.is_empty() {
            return Err(BuilderError::MissingField {
                field: "contract_address".to_string(),
            });
        }

        let metrics = self
            .metrics
            .unwrap_or_else(|| Arc::new(MetricsCollector::new()));

        Ok(BatchOrchestrator::with_metrics(ledger, self.config, metrics))
    }
}

impl Default for BatchOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Off-ledger driver for the distributor: validates batches, checks funding,
/// and submits each batch as a single transaction.
///
/// Signers and key providers are passed into every call and never stored.
pub struct BatchOrchestrator {
    client: DistributorClient,
    validator: InvoiceValidator,
    config: OrchestratorConfig,
    metrics: Arc<MetricsCollector>,
}

impl BatchOrchestrator {
    /// Create a new builder for constructing a BatchOrchestrator
    pub fn builder() -> BatchOrchestratorBuilder {
        BatchOrchestratorBuilder::new()
    }

    pub fn new(ledger: Arc<dyn LedgerClient>, config: OrchestratorConfig) -> Self {
        Self::with_metrics(ledger, config, Arc::new(MetricsCollector::new()))
    }

    fn with_metrics(
        ledger: Arc<dyn LedgerClient>,
        config: OrchestratorConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let client = DistributorClient::new(ledger, config.contract_address.clone())
            .with_timeout(config.ledger_timeout);
        let validator = InvoiceValidator::new(client.clone());
        Self {
            client,
            validator,
            config,
            metrics,
        }
    }

    pub fn client(&self) -> &DistributorClient {
        &self.client
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    // ==================== Checks ====================

    pub async fn check_token_exist_in_contract(
        &self,
        token: &str,
    ) -> Result<bool, OrchestratorError> {
        Ok(self.validator.check_token_exist_in_contract(token).await?)
    }

    pub async fn check_wallet_token_balance(
        &self,
        wallet: &str,
        token: &str,
        amount: Uint128,
    ) -> Result<bool, OrchestratorError> {
        Ok(self
            .validator
            .check_wallet_token_balance(wallet, token, amount)
            .await?)
    }

    pub async fn check_wallet_allowance(
        &self,
        wallet: &str,
        token: &str,
        amount: Uint128,
    ) -> Result<bool, OrchestratorError> {
        Ok(self
            .validator
            .check_wallet_allowance(wallet, token, amount)
            .await?)
    }

    // ==================== Setup ====================

    /// Register `token` with the distributor and return its registry id
    pub async fn register_token(
        &self,
        owner: &dyn WalletSigner,
        token: &str,
    ) -> Result<u16, OrchestratorError> {
        let tx = self
            .client
            .register_token(owner, token)
            .await
            .map_err(ledger_failure)?;
        let tx = ensure_tx_landed(tx)?;

        let id = tx
            .event_attribute("token_registered", "token_id")
            .and_then(|value| value.parse::<u16>().ok())
            .ok_or_else(|| OrchestratorError::MissingRegistrationEvent {
                hash: tx.hash.clone(),
            })?;

        self.metrics.record_token_registered();
        info!(token = token, token_id = id, tx_hash = %tx.hash, "token registered");
        Ok(id)
    }

    /// Let the distributor move an unbounded amount of `token` for `wallet`.
    ///
    /// Tops the allowance up to the maximum; returns `None` when it is
    /// already there and nothing was submitted.
    pub async fn grant_max_allowance(
        &self,
        keys: &dyn KeyProvider,
        wallet: &WalletRef,
        token: &str,
    ) -> Result<Option<TxResponse>, OrchestratorError> {
        let signer = keys.signer(wallet).await?;
        let current = self
            .client
            .token_allowance(token, signer.address())
            .await?;

        let missing = Uint128::MAX.checked_sub(current)?;
        if missing.is_zero() {
            debug!(wallet = %wallet, token = token, "allowance already at maximum");
            return Ok(None);
        }

        let tx = self
            .client
            .increase_allowance(signer.as_ref(), token, missing)
            .await
            .map_err(ledger_failure)?;
        let tx = ensure_tx_landed(tx)?;

        self.metrics.record_allowance_granted();
        info!(
            wallet = %wallet,
            address = signer.address(),
            token = token,
            tx_hash = %tx.hash,
            "granted max allowance"
        );
        Ok(Some(tx))
    }

    // ==================== Batches ====================

    /// Pay native coin to every invoice in one transaction.
    ///
    /// `amount_to_fund` is attached to the call and counts toward the
    /// contract balance. Fails before touching the ledger when the held
    /// balance plus the funding cannot cover the batch.
    pub async fn submit_native(
        &self,
        owner: &dyn WalletSigner,
        amount_to_fund: Uint128,
        invoices: Vec<NativeInvoice>,
    ) -> Result<TxResponse, OrchestratorError> {
        let batch = BatchSpan::new(BatchKind::Native, invoices.len());

        async move {
            let started = Instant::now();
            self.ensure_batch_size(BatchKind::Native, invoices.len())?;

            let required = checked_total(invoices.iter().map(|invoice| invoice.amount))?;
            let held = self.client.held_balance(&self.config.native_denom).await?;
            let available = held.checked_add(amount_to_fund)?;

            if required > available {
                warn!(%required, %held, funding = %amount_to_fund, "contract cannot cover native batch");
                self.metrics
                    .record_batch_rejected(BatchKind::Native, RejectReason::InsufficientFunds);
                return Err(OrchestratorError::InsufficientContractFunds {
                    required,
                    available,
                });
            }

            let funds = if amount_to_fund.is_zero() {
                vec![]
            } else {
                coins(amount_to_fund.u128(), self.config.native_denom.as_str())
            };

            let count = invoices.len();
            let tx = self
                .client
                .distribute_native(owner, invoices, funds)
                .await
                .map_err(ledger_failure)?;
            let tx = self.ensure_batch_landed(BatchKind::Native, tx)?;

            self.metrics
                .record_batch_submitted(BatchKind::Native, count, started.elapsed());
            info!(tx_hash = %tx.hash, total = %required, "native batch distributed");
            Ok(tx)
        }
        .instrument(batch.span())
        .await
    }

    /// Validate and submit a token batch.
    ///
    /// Returns the validation errors without submitting anything if any
    /// invoice fails its checks; an empty list means the batch landed.
    pub async fn submit_tokens(
        &self,
        owner: &dyn WalletSigner,
        keys: &dyn KeyProvider,
        invoices: Vec<SendingTokenInvoice>,
    ) -> Result<Vec<ValidationError>, OrchestratorError> {
        let batch = BatchSpan::new(BatchKind::Token, invoices.len());

        async move {
            let started = Instant::now();
            self.ensure_batch_size(BatchKind::Token, invoices.len())?;

            if invoices.is_empty() {
                debug!("empty token batch, nothing to submit");
                return Ok(Vec::new());
            }

            let errors = self.validator.validate(keys, &invoices).await?;
            if !errors.is_empty() {
                warn!(errors = errors.len(), "token batch failed validation, nothing submitted");
                self.metrics.record_validation_errors(&errors);
                self.metrics
                    .record_batch_rejected(BatchKind::Token, RejectReason::Validation);
                return Ok(errors);
            }

            let resolved =
                try_join_all(invoices.iter().map(|invoice| self.resolve(keys, invoice))).await?;

            let count = resolved.len();
            let tx = self
                .client
                .distribute_tokens(owner, resolved)
                .await
                .map_err(ledger_failure)?;
            let tx = self.ensure_batch_landed(BatchKind::Token, tx)?;

            self.metrics
                .record_batch_submitted(BatchKind::Token, count, started.elapsed());
            info!(tx_hash = %tx.hash, "token batch distributed");
            Ok(Vec::new())
        }
        .instrument(batch.span())
        .await
    }

    /// Turn an off-ledger invoice into its on-ledger form
    async fn resolve(
        &self,
        keys: &dyn KeyProvider,
        invoice: &SendingTokenInvoice,
    ) -> Result<TokenInvoice, OrchestratorError> {
        let token = self.client.token_id(&invoice.token_address).await?;
        let sender = keys.address(&invoice.wallet).await?;

        Ok(TokenInvoice {
            token,
            sender,
            receiver: invoice.receiver.clone(),
            amount: invoice.amount,
        })
    }

    fn ensure_batch_size(&self, kind: BatchKind, size: usize) -> Result<(), OrchestratorError> {
        if size > self.config.max_batch_size {
            self.metrics.record_batch_rejected(kind, RejectReason::TooLarge);
            return Err(OrchestratorError::BatchTooLarge {
                size,
                max: self.config.max_batch_size,
            });
        }
        Ok(())
    }

    fn ensure_batch_landed(
        &self,
        kind: BatchKind,
        tx: TxResponse,
    ) -> Result<TxResponse, OrchestratorError> {
        if tx.is_success() {
            return Ok(tx);
        }

        self.metrics.record_batch_reverted(kind);
        error!(
            kind = kind.as_str(),
            tx_hash = %tx.hash,
            code = tx.code,
            raw_log = %tx.raw_log,
            "batch reverted"
        );
        Err(OrchestratorError::BatchReverted {
            hash: tx.hash,
            code: tx.code,
            raw_log: tx.raw_log,
        })
    }
}

fn ensure_tx_landed(tx: TxResponse) -> Result<TxResponse, OrchestratorError> {
    if tx.is_success() {
        return Ok(tx);
    }

    warn!(tx_hash = %tx.hash, code = tx.code, raw_log = %tx.raw_log, "transaction reverted");
    Err(OrchestratorError::TxReverted {
        hash: tx.hash,
        code: tx.code,
        raw_log: tx.raw_log,
    })
}

fn ledger_failure(err: LedgerError) -> OrchestratorError {
    error!(error_type = err.error_type(), error = %err, "ledger call failed");
    OrchestratorError::Ledger(err)
}
