//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `chain`: Blocks and transactions as decoded from the node
//! - `ledger`: Ledger entries, the final ledger and scan gaps
//! - `reputation`: Address reputation records
//! - `error`: Error types for the address ledger

pub mod chain;
pub mod error;
pub mod ledger;
pub mod reputation;

pub use chain::{Block, Prevout, RawTransaction, ScriptPubKey, TxInput, TxOutput};
pub use error::{AppError, LedgerError, ReportError, ReputationError, RpcError, SettingsError};
pub use ledger::{Direction, Ledger, LedgerEntry, ScanGap};
pub use reputation::AddressReputation;
