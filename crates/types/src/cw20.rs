//! Subset of the CW20 fungible token interface the distributor speaks.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};

#[cw_serde]
pub enum Cw20ExecuteMsg {
    /// Move `amount` from `owner` to `recipient` using the caller's allowance
    TransferFrom {
        owner: String,
        recipient: String,
        amount: Uint128,
    },
    /// Raise the allowance `spender` holds over the caller's balance
    IncreaseAllowance { spender: String, amount: Uint128 },
}

#[cw_serde]
pub enum Cw20QueryMsg {
    Balance { address: String },
    Allowance { owner: String, spender: String },
}

// Responses skip `deny_unknown_fields` so that token contracts returning
// extra fields (e.g. allowance expiry) still decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cw20BalanceResponse {
    pub balance: Uint128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cw20AllowanceResponse {
    pub allowance: Uint128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_from_wire_format() {
        let msg = Cw20ExecuteMsg::TransferFrom {
            owner: "alice".to_string(),
            recipient: "bob".to_string(),
            amount: Uint128::new(7),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"transfer_from":{"owner":"alice","recipient":"bob","amount":"7"}}"#
        );
    }

    #[test]
    fn test_allowance_response_ignores_expiry() {
        let json = r#"{"allowance":"25","expires":{"never":{}}}"#;
        let response: Cw20AllowanceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.allowance, Uint128::new(25));
    }
}
