use cosmwasm_schema::cw_serde;
use cosmwasm_std::{OverflowError, Uint128};
use serde::{Deserialize, Serialize};

use crate::WalletRef;

/// Native coin transfer paid out of the distributor's own balance
#[cw_serde]
pub struct NativeInvoice {
    pub receiver: String,
    pub amount: Uint128,
}

impl NativeInvoice {
    pub fn new(receiver: impl Into<String>, amount: u128) -> Self {
        Self {
            receiver: receiver.into(),
            amount: Uint128::new(amount),
        }
    }
}

/// Token transfer as executed on the ledger.
///
/// `token` is the registry id; `sender` must have granted the distributor
/// an allowance covering `amount`.
#[cw_serde]
pub struct TokenInvoice {
    pub token: u16,
    pub sender: String,
    pub receiver: String,
    pub amount: Uint128,
}

/// Token transfer as requested off-ledger, before the sender wallet and the
/// token registry id have been resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendingTokenInvoice {
    pub wallet: WalletRef,
    pub token_address: String,
    pub amount: Uint128,
    pub receiver: String,
}

impl SendingTokenInvoice {
    pub fn new(
        wallet: WalletRef,
        token_address: impl Into<String>,
        amount: u128,
        receiver: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            token_address: token_address.into(),
            amount: Uint128::new(amount),
            receiver: receiver.into(),
        }
    }
}

/// Kind of batch, used for logging and metric labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    Native,
    Token,
}

impl BatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Native => "native",
            BatchKind::Token => "token",
        }
    }
}

/// Sum of amounts, failing instead of wrapping on overflow
pub fn checked_total<I>(amounts: I) -> Result<Uint128, OverflowError>
where
    I: IntoIterator<Item = Uint128>,
{
    amounts
        .into_iter()
        .try_fold(Uint128::zero(), |acc, amount| acc.checked_add(amount))
}
