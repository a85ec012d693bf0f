//! Batch distributor: a CosmWasm token registry with atomic batch payouts,
//! and the off-ledger orchestrator that validates, funds and submits batches.

pub use batch_distributor_config as config;
pub use batch_distributor_contract as contract;
pub use batch_distributor_metrics as metrics;
pub use batch_distributor_orchestrator as orchestrator;
pub use batch_distributor_types as types;
