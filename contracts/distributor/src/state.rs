use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    /// Only address allowed to register tokens and distribute
    pub owner: Addr,
    /// Bank denomination paid out by native batches
    pub native_denom: String,
}

pub const CONFIG: Item<Config> = Item::new("config");
/// Last assigned registry id; 0 until the first registration
pub const TOKEN_COUNT: Item<u16> = Item::new("token_count");
pub const TOKENS: Map<u16, Addr> = Map::new("tokens");
/// Reverse index holding the lowest id registered for each address
pub const TOKEN_IDS: Map<&Addr, u16> = Map::new("token_ids");
