//! Core business logic module
//!
//! This module contains the address-history reconstruction components:
//! - `traits` - Trait abstractions over the node and the reputation service
//! - `scanner` - Sequential block/transaction walk with gap reporting
//! - `ledger` - Input/output matching and running balance

pub mod ledger;
pub mod scanner;
pub mod traits;

pub use ledger::{match_transaction, LedgerBuilder};
pub use scanner::{ChainScanner, ScanOutcome};
pub use traits::{ChainSource, ReputationSource};
