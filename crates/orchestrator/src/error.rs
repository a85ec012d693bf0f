use cosmwasm_std::{OverflowError, Uint128};
use thiserror::Error;

use crate::keys::KeyError;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("insufficient contract funds: batch needs {required}, contract can cover {available}")]
    InsufficientContractFunds {
        required: Uint128,
        available: Uint128,
    },

    #[error("batch of {size} invoices exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("batch reverted in tx {hash} (code {code}): {raw_log}")]
    BatchReverted {
        hash: String,
        code: u32,
        raw_log: String,
    },

    #[error("tx {hash} reverted (code {code}): {raw_log}")]
    TxReverted {
        hash: String,
        code: u32,
        raw_log: String,
    },

    #[error("tx {hash} carries no token registration event")]
    MissingRegistrationEvent { hash: String },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("amount overflow: {0}")]
    Overflow(#[from] OverflowError),
}

/// Builder error
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingField { field: String },
}
