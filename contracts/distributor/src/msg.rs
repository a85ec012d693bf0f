use batch_distributor_types::{NativeInvoice, TokenInvoice};
use cosmwasm_schema::{cw_serde, QueryResponses};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    pub native_denom: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Register a CW20 token under the next registry id (owner only)
    RegisterToken { address: String },
    /// Pay native coin out of the contract balance (owner only).
    /// Funds attached to this call count toward the balance.
    DistributeNative { invoices: Vec<NativeInvoice> },
    /// Move CW20 tokens from many senders to many receivers (owner only)
    DistributeTokens { invoices: Vec<TokenInvoice> },
    /// Accept native coin funding from anyone
    Deposit {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    /// Fails for id 0, which is reserved
    #[returns(TokenAddressResponse)]
    TokenAddress { id: u16 },

    /// Returns id 0 when the address is not registered
    #[returns(TokenIdResponse)]
    TokenId { address: String },

    #[returns(TokensResponse)]
    Tokens {
        start_after: Option<u16>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: String,
    pub native_denom: String,
    pub token_count: u16,
}

#[cw_serde]
pub struct TokenAddressResponse {
    pub id: u16,
    /// None when the id has not been assigned yet
    pub address: Option<String>,
}

#[cw_serde]
pub struct TokenIdResponse {
    pub id: u16,
}

#[cw_serde]
pub struct TokenEntry {
    pub id: u16,
    pub address: String,
}

#[cw_serde]
pub struct TokensResponse {
    pub tokens: Vec<TokenEntry>,
}
