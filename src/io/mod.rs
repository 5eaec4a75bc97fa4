//! I/O module
//!
//! Handles everything that crosses the process boundary.
//!
//! # Components
//!
//! - `settings` - Settings document loading and validation
//! - `rpc_client` - Blocking JSON-RPC client for the node
//! - `reputation_client` - Blocking HTTP client for the reputation service
//! - `csv_format` - CSV export of the ledger

pub mod csv_format;
pub mod reputation_client;
pub mod rpc_client;
pub mod settings;

pub use csv_format::{format_btc, write_ledger_csv};
pub use reputation_client::ReputationClient;
pub use rpc_client::{RpcClient, RpcConfig};
pub use settings::Settings;
