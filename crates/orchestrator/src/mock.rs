//! In-memory ledger hosting the real distributor contract, for tests and demos.
//!
//! `MockLedger` keeps native bank balances and CW20 token ledgers in memory
//! and runs the distributor contract through `cosmwasm_std::testing`. Each
//! transaction is applied to a staged copy of the state and committed only if
//! the contract call and every message it emits succeed, so a failed
//! transaction leaves every balance untouched.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use batch_distributor_contract::contract;
use batch_distributor_contract::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use batch_distributor_types::{
    Cw20AllowanceResponse, Cw20BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, WalletRef,
};
use cosmwasm_std::testing::{message_info, mock_env, MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    from_json, to_json_binary, Addr, BankMsg, Binary, Coin, CosmosMsg, Empty, Env, Event, Order,
    OwnedDeps, Response, Storage, Uint128, WasmMsg,
};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::keys::{KeyError, KeyProvider, WalletSigner};
use crate::ledger::{LedgerClient, LedgerError, TxResponse};

/// Code reported for every transaction the mock ledger rejects
pub const FAILED_TX_CODE: u32 = 5;

type ContractDeps = OwnedDeps<MockStorage, MockApi, MockQuerier, Empty>;

/// A transaction as seen by the mock ledger, successful or not
#[derive(Debug, Clone)]
pub struct RecordedTx {
    pub hash: String,
    pub height: u64,
    pub sender: String,
    pub contract: String,
    pub msg: Binary,
    pub funds: Vec<Coin>,
    pub code: u32,
    /// Hex signature produced by the sender's signer
    pub signature: String,
}

#[derive(Clone, Default)]
struct Cw20Ledger {
    balances: HashMap<String, Uint128>,
    allowances: HashMap<(String, String), Uint128>,
}

impl Cw20Ledger {
    fn balance(&self, owner: &str) -> Uint128 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &str, spender: &str) -> Uint128 {
        self.allowances
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn increase_allowance(
        &mut self,
        owner: &str,
        spender: &str,
        amount: Uint128,
    ) -> Result<(), String> {
        let allowance = self
            .allowance(owner, spender)
            .checked_add(amount)
            .map_err(|e| e.to_string())?;
        self.allowances
            .insert((owner.to_string(), spender.to_string()), allowance);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &str,
        owner: &str,
        recipient: &str,
        amount: Uint128,
    ) -> Result<(), String> {
        let allowance = self.allowance(owner, spender);
        let remaining = allowance.checked_sub(amount).map_err(|_| {
            format!("insufficient allowance: {owner} allows {spender} {allowance}, needs {amount}")
        })?;

        let balance = self.balance(owner);
        let left = balance
            .checked_sub(amount)
            .map_err(|_| format!("insufficient token balance: {owner} has {balance}, needs {amount}"))?;

        self.allowances
            .insert((owner.to_string(), spender.to_string()), remaining);
        self.balances.insert(owner.to_string(), left);

        let credited = self
            .balance(recipient)
            .checked_add(amount)
            .map_err(|e| e.to_string())?;
        self.balances.insert(recipient.to_string(), credited);
        Ok(())
    }
}

/// Bank and token balances; cloned to stage a transaction
#[derive(Clone, Default)]
struct ChainState {
    bank: HashMap<(String, String), Uint128>,
    tokens: HashMap<String, Cw20Ledger>,
}

impl ChainState {
    fn balance(&self, address: &str, denom: &str) -> Uint128 {
        self.bank
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn balances_of(&self, address: &str) -> Vec<Coin> {
        self.bank
            .iter()
            .filter(|((owner, _), amount)| owner == address && !amount.is_zero())
            .map(|((_, denom), amount)| Coin::new(*amount, denom.as_str()))
            .collect()
    }

    fn send(&mut self, from: &str, to: &str, coin: &Coin) -> Result<(), String> {
        let balance = self.balance(from, &coin.denom);
        let left = balance.checked_sub(coin.amount).map_err(|_| {
            format!(
                "insufficient funds: {from} has {balance}{denom}, needs {amount}{denom}",
                denom = coin.denom,
                amount = coin.amount
            )
        })?;
        self.bank
            .insert((from.to_string(), coin.denom.clone()), left);

        let credited = self
            .balance(to, &coin.denom)
            .checked_add(coin.amount)
            .map_err(|e| e.to_string())?;
        self.bank
            .insert((to.to_string(), coin.denom.clone()), credited);
        Ok(())
    }

    /// Run a CW20 execute message against an in-memory token
    fn execute_cw20(&mut self, token: &str, caller: &str, msg: &Binary) -> Result<Event, String> {
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| format!("no contract at {token}"))?;
        let msg: Cw20ExecuteMsg = from_json(msg).map_err(|e| e.to_string())?;

        let event = Event::new("wasm").add_attribute("_contract_address", token);
        match msg {
            Cw20ExecuteMsg::TransferFrom {
                owner,
                recipient,
                amount,
            } => {
                ledger.transfer_from(caller, &owner, &recipient, amount)?;
                Ok(event
                    .add_attribute("action", "transfer_from")
                    .add_attribute("from", owner)
                    .add_attribute("to", recipient)
                    .add_attribute("by", caller)
                    .add_attribute("amount", amount))
            }
            Cw20ExecuteMsg::IncreaseAllowance { spender, amount } => {
                ledger.increase_allowance(caller, &spender, amount)?;
                Ok(event
                    .add_attribute("action", "increase_allowance")
                    .add_attribute("owner", caller)
                    .add_attribute("spender", spender)
                    .add_attribute("amount", amount))
            }
        }
    }

    /// Apply one message emitted by the distributor contract
    fn apply_message(&mut self, contract: &str, msg: &CosmosMsg) -> Result<Vec<Event>, String> {
        match msg {
            CosmosMsg::Bank(BankMsg::Send { to_address, amount }) => {
                for coin in amount {
                    self.send(contract, to_address, coin)?;
                }
                Ok(vec![Event::new("transfer")
                    .add_attribute("recipient", to_address)
                    .add_attribute("sender", contract)])
            }
            CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr,
                msg,
                funds,
            }) => {
                for coin in funds {
                    self.send(contract, contract_addr, coin)?;
                }
                Ok(vec![self.execute_cw20(contract_addr, contract, msg)?])
            }
            other => Err(format!("unsupported message: {other:?}")),
        }
    }
}

struct MockState {
    chain: ChainState,
    storage: MockStorage,
    env: Env,
    txs: Vec<RecordedTx>,
    fail_next: Option<String>,
}

/// In-memory ledger running the distributor contract
pub struct MockLedger {
    contract_address: String,
    native_denom: String,
    state: Mutex<MockState>,
}

impl MockLedger {
    /// Deploy the distributor owned by `owner`
    pub fn new(owner: &str, native_denom: &str) -> Result<Self, LedgerError> {
        let env = mock_env();
        let contract_address = env.contract.address.to_string();

        let mut deps = contract_deps(MockStorage::new(), &contract_address, &[]);
        contract::instantiate(
            deps.as_mut(),
            env.clone(),
            message_info(&Addr::unchecked(owner), &[]),
            InstantiateMsg {
                owner: owner.to_string(),
                native_denom: native_denom.to_string(),
            },
        )
        .map_err(|e| LedgerError::TxFailed(e.to_string()))?;

        Ok(Self {
            contract_address,
            native_denom: native_denom.to_string(),
            state: Mutex::new(MockState {
                chain: ChainState::default(),
                storage: deps.storage,
                env,
                txs: Vec::new(),
                fail_next: None,
            }),
        })
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn native_denom(&self) -> &str {
        &self.native_denom
    }

    /// Deterministic valid address for a label
    pub fn address(&self, label: &str) -> String {
        MockApi::default().addr_make(label).to_string()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Native coin ====================

    /// Overwrite the native balance of `address`
    pub fn set_balance(&self, address: &str, amount: u128) {
        self.lock().chain.bank.insert(
            (address.to_string(), self.native_denom.clone()),
            Uint128::new(amount),
        );
    }

    pub fn balance(&self, address: &str) -> Uint128 {
        self.lock().chain.balance(address, &self.native_denom)
    }

    // ==================== CW20 tokens ====================

    /// Deploy an empty CW20 token and return its address
    pub fn create_token(&self, label: &str) -> String {
        let token = self.address(label);
        self.lock()
            .chain
            .tokens
            .insert(token.clone(), Cw20Ledger::default());
        token
    }

    /// Credit `amount` of `token` to `owner`, deploying the token if needed
    pub fn mint(&self, token: &str, owner: &str, amount: u128) {
        let mut state = self.lock();
        let ledger = state.chain.tokens.entry(token.to_string()).or_default();
        let balance = ledger.balance(owner) + Uint128::new(amount);
        ledger.balances.insert(owner.to_string(), balance);
    }

    /// Overwrite the allowance `owner` grants the distributor
    pub fn set_allowance(&self, token: &str, owner: &str, amount: u128) {
        let mut state = self.lock();
        let ledger = state.chain.tokens.entry(token.to_string()).or_default();
        ledger.allowances.insert(
            (owner.to_string(), self.contract_address.clone()),
            Uint128::new(amount),
        );
    }

    pub fn token_balance(&self, token: &str, owner: &str) -> Uint128 {
        self.lock()
            .chain
            .tokens
            .get(token)
            .map(|ledger| ledger.balance(owner))
            .unwrap_or_default()
    }

    /// Allowance `owner` grants the distributor
    pub fn allowance(&self, token: &str, owner: &str) -> Uint128 {
        self.lock()
            .chain
            .tokens
            .get(token)
            .map(|ledger| ledger.allowance(owner, &self.contract_address))
            .unwrap_or_default()
    }

    // ==================== Transactions ====================

    /// Every transaction submitted so far, including failed ones
    pub fn transactions(&self) -> Vec<RecordedTx> {
        self.lock().txs.clone()
    }

    pub fn tx_count(&self) -> usize {
        self.lock().txs.len()
    }

    /// Make the next transaction fail with `raw_log` without touching state
    pub fn fail_next_transaction(&self, raw_log: impl Into<String>) {
        self.lock().fail_next = Some(raw_log.into());
    }

    /// Stage one transaction against `state` without committing it
    fn apply_transaction(
        &self,
        state: &mut MockState,
        sender: &str,
        contract: &str,
        msg: &Binary,
        funds: &[Coin],
    ) -> Result<(Vec<Event>, Option<MockStorage>, ChainState), String> {
        if let Some(raw_log) = state.fail_next.take() {
            return Err(raw_log);
        }

        let mut chain = state.chain.clone();
        for coin in funds {
            chain.send(sender, contract, coin)?;
        }

        if contract != self.contract_address {
            let event = chain.execute_cw20(contract, sender, msg)?;
            return Ok((vec![event], None, chain));
        }

        let msg: ExecuteMsg = from_json(msg).map_err(|e| e.to_string())?;
        let balance = chain.balances_of(contract);
        let mut deps = contract_deps(snapshot(&state.storage), contract, &balance);

        let response = contract::execute(
            deps.as_mut(),
            state.env.clone(),
            message_info(&Addr::unchecked(sender), funds),
            msg,
        )
        .map_err(|e| e.to_string())?;

        let mut events = contract_events(contract, &response);
        for sub in &response.messages {
            events.extend(chain.apply_message(contract, &sub.msg)?);
        }

        Ok((events, Some(deps.storage), chain))
    }

    fn query_distributor(&self, msg: &Binary) -> Result<Binary, LedgerError> {
        let msg: QueryMsg =
            from_json(msg).map_err(|e| LedgerError::EncodingError(e.to_string()))?;

        let mut state = self.lock();
        let balance = state.chain.balances_of(&self.contract_address);
        let storage = std::mem::take(&mut state.storage);
        let deps = contract_deps(storage, &self.contract_address, &balance);

        let result = contract::query(deps.as_ref(), state.env.clone(), msg);
        state.storage = deps.storage;

        result.map_err(|e| LedgerError::QueryFailed(e.to_string()))
    }

    fn query_token(&self, token: &str, msg: &Binary) -> Result<Binary, LedgerError> {
        let state = self.lock();
        let ledger = state
            .chain
            .tokens
            .get(token)
            .ok_or_else(|| LedgerError::QueryFailed(format!("no contract at {token}")))?;

        let msg: Cw20QueryMsg =
            from_json(msg).map_err(|e| LedgerError::EncodingError(e.to_string()))?;
        let response = match msg {
            Cw20QueryMsg::Balance { address } => to_json_binary(&Cw20BalanceResponse {
                balance: ledger.balance(&address),
            }),
            Cw20QueryMsg::Allowance { owner, spender } => to_json_binary(&Cw20AllowanceResponse {
                allowance: ledger.allowance(&owner, &spender),
            }),
        };
        response.map_err(|e| LedgerError::EncodingError(e.to_string()))
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn query_native_balance(
        &self,
        address: &str,
        denom: &str,
    ) -> Result<Uint128, LedgerError> {
        Ok(self.lock().chain.balance(address, denom))
    }

    async fn query_contract(&self, contract: &str, msg: Binary) -> Result<Binary, LedgerError> {
        if contract == self.contract_address {
            self.query_distributor(&msg)
        } else {
            self.query_token(contract, &msg)
        }
    }

    async fn execute_contract(
        &self,
        signer: &dyn WalletSigner,
        contract: &str,
        msg: Binary,
        funds: Vec<Coin>,
    ) -> Result<TxResponse, LedgerError> {
        let signature = signer
            .sign(msg.as_slice())
            .await
            .map_err(|e| LedgerError::TxFailed(e.to_string()))?;
        Ok(self.commit_transaction(signer.address(), contract, msg, funds, signature))
    }
}

impl MockLedger {
    /// Stage, commit and record one transaction under a single lock, so
    /// concurrent transactions are applied one after another
    fn commit_transaction(
        &self,
        sender: &str,
        contract: &str,
        msg: Binary,
        funds: Vec<Coin>,
        signature: Vec<u8>,
    ) -> TxResponse {
        let mut state = self.lock();
        let outcome = self.apply_transaction(&mut state, sender, contract, &msg, &funds);

        state.env.block.height += 1;
        let height = state.env.block.height;
        let hash = tx_hash(height, sender, &msg);

        let (code, raw_log, events) = match outcome {
            Ok((events, storage, chain)) => {
                state.chain = chain;
                if let Some(storage) = storage {
                    state.storage = storage;
                }
                (0, String::new(), events)
            }
            Err(raw_log) => (FAILED_TX_CODE, raw_log, Vec::new()),
        };

        debug!(tx_hash = %hash, height, code, contract, "mock ledger applied tx");
        state.txs.push(RecordedTx {
            hash: hash.clone(),
            height,
            sender: sender.to_string(),
            contract: contract.to_string(),
            msg,
            funds,
            code,
            signature: hex::encode(signature),
        });

        TxResponse {
            hash,
            height,
            gas_used: 0,
            code,
            raw_log,
            events,
        }
    }
}

fn contract_deps(storage: MockStorage, contract: &str, balance: &[Coin]) -> ContractDeps {
    OwnedDeps {
        storage,
        api: MockApi::default(),
        querier: MockQuerier::new(&[(contract, balance)]),
        custom_query_type: PhantomData,
    }
}

/// Independent copy of contract storage
fn snapshot(storage: &MockStorage) -> MockStorage {
    let mut copy = MockStorage::new();
    for (key, value) in storage.range(None, None, Order::Ascending) {
        copy.set(&key, &value);
    }
    copy
}

/// Events as a chain reports them for a contract response
fn contract_events(contract: &str, response: &Response) -> Vec<Event> {
    let mut events = vec![Event::new("wasm")
        .add_attribute("_contract_address", contract)
        .add_attributes(response.attributes.clone())];

    events.extend(response.events.iter().map(|event| {
        Event::new(format!("wasm-{}", event.ty))
            .add_attribute("_contract_address", contract)
            .add_attributes(event.attributes.clone())
    }));
    events
}

fn tx_hash(height: u64, sender: &str, msg: &Binary) -> String {
    let mut hasher = Sha256::new();
    hasher.update(height.to_be_bytes());
    hasher.update(sender.as_bytes());
    hasher.update(msg.as_slice());
    hex::encode_upper(hasher.finalize())
}

/// Signer whose signature is the SHA-256 of address and payload
#[derive(Debug, Clone)]
pub struct MockSigner {
    address: String,
}

impl MockSigner {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl WalletSigner for MockSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError> {
        let mut hasher = Sha256::new();
        hasher.update(self.address.as_bytes());
        hasher.update(payload);
        Ok(hasher.finalize().to_vec())
    }
}

/// Key provider deriving one deterministic address per wallet reference
#[derive(Debug, Default)]
pub struct MockKeyProvider {
    revoked: Mutex<HashSet<WalletRef>>,
}

impl MockKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address_of(&self, wallet: &WalletRef) -> String {
        MockApi::default()
            .addr_make(&wallet.derivation_path())
            .to_string()
    }

    /// Signer for `wallet`, bypassing revocation
    pub fn signer_for(&self, wallet: &WalletRef) -> Arc<MockSigner> {
        Arc::new(MockSigner::new(self.address_of(wallet)))
    }

    /// Make the provider refuse `wallet` from now on
    pub fn revoke(&self, wallet: WalletRef) {
        self.revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(wallet);
    }
}

#[async_trait]
impl KeyProvider for MockKeyProvider {
    async fn signer(&self, wallet: &WalletRef) -> Result<Arc<dyn WalletSigner>, KeyError> {
        let revoked = self
            .revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(wallet);
        if revoked {
            return Err(KeyError::UnknownWallet(*wallet));
        }
        Ok(self.signer_for(wallet))
    }
}
