use cosmwasm_std::{OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Token id already assigned: {id}")]
    TokenIdTaken { id: u16 },

    #[error("Token registry is full")]
    RegistryFull {},

    #[error("Token not registered: {id}")]
    TokenNotRegistered { id: u16 },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("Invalid invoice {index}: {reason}")]
    InvalidInvoice { index: usize, reason: String },
}
