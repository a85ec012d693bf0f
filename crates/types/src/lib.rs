pub mod cw20;
pub mod invoice;
pub mod validation;
pub mod wallet;

pub use cw20::*;
pub use invoice::*;
pub use validation::*;
pub use wallet::*;

/// Registry id reserved to mean "no such registered token"
pub const UNREGISTERED_TOKEN_ID: u16 = 0;
