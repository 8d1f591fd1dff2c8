pub mod api_server_axum;
pub mod config;
pub mod delta_client;
pub mod error;
pub mod logging;
pub mod models;
pub mod processor;
pub mod rules;

// Re-exports for convenience
pub use delta_client::DeltaClient;
pub use models::{ContractRecord, ContractType, MarketSnapshot};
pub use processor::{ChainRow, ChainTable, OptionLeg, PriceCell, build_chain};
pub use rules::{SignalResult, run_strategy};
