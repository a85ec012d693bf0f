use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a single invoice failed pre-flight validation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TokenNotInContract,
    InsufficientBalance,
    InsufficientAllowance,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TokenNotInContract => "TOKEN_NOT_IN_CONTRACT",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::InsufficientAllowance => "INSUFFICIENT_ALLOWANCE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed check for one invoice. Returned as data, never raised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Position of the invoice in the submitted batch
    pub index: usize,
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn token_not_in_contract(index: usize, token: &str) -> Self {
        Self {
            index,
            code: ErrorCode::TokenNotInContract,
            message: format!("token {token} is not registered in the distributor"),
        }
    }

    pub fn insufficient_balance(
        index: usize,
        wallet: &str,
        token: &str,
        balance: Uint128,
        amount: Uint128,
    ) -> Self {
        Self {
            index,
            code: ErrorCode::InsufficientBalance,
            message: format!(
                "wallet {wallet} holds {balance} of token {token}, needs more than {amount}"
            ),
        }
    }

    pub fn insufficient_allowance(
        index: usize,
        wallet: &str,
        token: &str,
        allowance: Uint128,
        amount: Uint128,
    ) -> Self {
        Self {
            index,
            code: ErrorCode::InsufficientAllowance,
            message: format!(
                "wallet {wallet} allows the distributor {allowance} of token {token}, needs more than {amount}"
            ),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invoice {}: {}: {}", self.index, self.code, self.message)
    }
}
