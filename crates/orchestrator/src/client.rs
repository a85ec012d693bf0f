use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use batch_distributor_contract::msg::{
    ExecuteMsg, QueryMsg, TokenAddressResponse, TokenIdResponse,
};
use batch_distributor_types::{
    Cw20AllowanceResponse, Cw20BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, NativeInvoice,
    TokenInvoice,
};
use cosmwasm_std::{from_json, to_json_binary, Coin, Uint128};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::keys::WalletSigner;
use crate::ledger::{LedgerClient, LedgerError, TxResponse};

/// Bound on a single ledger call unless configured otherwise
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Typed access to the distributor contract and the CW20 tokens it moves
#[derive(Clone)]
pub struct DistributorClient {
    ledger: Arc<dyn LedgerClient>,
    contract: String,
    timeout: Duration,
}

impl DistributorClient {
    pub fn new(ledger: Arc<dyn LedgerClient>, contract: impl Into<String>) -> Self {
        Self {
            ledger,
            contract: contract.into(),
            timeout: DEFAULT_LEDGER_TIMEOUT,
        }
    }

    /// Fail any ledger call that takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, call: &str, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| {
                LedgerError::Timeout(format!("{call} exceeded {}ms", self.timeout.as_millis()))
            })?
    }

    /// Address of the distributor contract
    pub fn contract_address(&self) -> &str {
        &self.contract
    }

    async fn query<M, R>(&self, contract: &str, msg: &M) -> Result<R, LedgerError>
    where
        M: Serialize,
        R: DeserializeOwned,
    {
        let msg = to_json_binary(msg).map_err(|e| LedgerError::EncodingError(e.to_string()))?;
        let response = self
            .bounded("query", self.ledger.query_contract(contract, msg))
            .await?;
        from_json(&response).map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }

    async fn execute<M: Serialize>(
        &self,
        signer: &dyn WalletSigner,
        contract: &str,
        msg: &M,
        funds: Vec<Coin>,
    ) -> Result<TxResponse, LedgerError> {
        let msg = to_json_binary(msg).map_err(|e| LedgerError::EncodingError(e.to_string()))?;
        let tx = self
            .bounded(
                "execute",
                self.ledger.execute_contract(signer, contract, msg, funds),
            )
            .await?;
        debug!(
            tx_hash = %tx.hash,
            height = tx.height,
            code = tx.code,
            contract = contract,
            "transaction included"
        );
        Ok(tx)
    }

    // ==================== Registry ====================

    /// Registry id of a token, 0 if it is not registered
    pub async fn token_id(&self, token: &str) -> Result<u16, LedgerError> {
        let response: TokenIdResponse = self
            .query(
                &self.contract,
                &QueryMsg::TokenId {
                    address: token.to_string(),
                },
            )
            .await?;
        Ok(response.id)
    }

    /// Address registered under `id`, if any
    pub async fn token_address(&self, id: u16) -> Result<Option<String>, LedgerError> {
        let response: TokenAddressResponse = self
            .query(&self.contract, &QueryMsg::TokenAddress { id })
            .await?;
        Ok(response.address)
    }

    pub async fn register_token(
        &self,
        owner: &dyn WalletSigner,
        token: &str,
    ) -> Result<TxResponse, LedgerError> {
        let msg = ExecuteMsg::RegisterToken {
            address: token.to_string(),
        };
        self.execute(owner, &self.contract, &msg, vec![]).await
    }

    // ==================== Balances ====================

    /// Native balance held by the distributor contract
    pub async fn held_balance(&self, denom: &str) -> Result<Uint128, LedgerError> {
        self.bounded(
            "balance query",
            self.ledger.query_native_balance(&self.contract, denom),
        )
        .await
    }

    /// CW20 balance of `owner`
    pub async fn token_balance(&self, token: &str, owner: &str) -> Result<Uint128, LedgerError> {
        let response: Cw20BalanceResponse = self
            .query(
                token,
                &Cw20QueryMsg::Balance {
                    address: owner.to_string(),
                },
            )
            .await?;
        Ok(response.balance)
    }

    /// CW20 allowance `owner` has granted to the distributor
    pub async fn token_allowance(
        &self,
        token: &str,
        owner: &str,
    ) -> Result<Uint128, LedgerError> {
        let response: Cw20AllowanceResponse = self
            .query(
                token,
                &Cw20QueryMsg::Allowance {
                    owner: owner.to_string(),
                    spender: self.contract.clone(),
                },
            )
            .await?;
        Ok(response.allowance)
    }

    /// Raise the allowance the signer grants the distributor over `token`
    pub async fn increase_allowance(
        &self,
        signer: &dyn WalletSigner,
        token: &str,
        amount: Uint128,
    ) -> Result<TxResponse, LedgerError> {
        let msg = Cw20ExecuteMsg::IncreaseAllowance {
            spender: self.contract.clone(),
            amount,
        };
        self.execute(signer, token, &msg, vec![]).await
    }

    // ==================== Distribution ====================

    /// Fund the distributor without distributing anything
    pub async fn deposit(
        &self,
        signer: &dyn WalletSigner,
        funds: Vec<Coin>,
    ) -> Result<TxResponse, LedgerError> {
        self.execute(signer, &self.contract, &ExecuteMsg::Deposit {}, funds)
            .await
    }

    pub async fn distribute_native(
        &self,
        owner: &dyn WalletSigner,
        invoices: Vec<NativeInvoice>,
        funds: Vec<Coin>,
    ) -> Result<TxResponse, LedgerError> {
        let msg = ExecuteMsg::DistributeNative { invoices };
        self.execute(owner, &self.contract, &msg, funds).await
    }

    pub async fn distribute_tokens(
        &self,
        owner: &dyn WalletSigner,
        invoices: Vec<TokenInvoice>,
    ) -> Result<TxResponse, LedgerError> {
        let msg = ExecuteMsg::DistributeTokens { invoices };
        self.execute(owner, &self.contract, &msg, vec![]).await
    }
}
