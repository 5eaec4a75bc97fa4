//! Address Ledger Library
//! # Overview
//!
//! This library reconstructs the transaction history of a single blockchain
//! address by scanning a node over JSON-RPC, and renders it as a PDF report
//! with a CSV export alongside.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (chain wire types, ledger entries, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::scanner`] - Sequential walk over every block and transaction
//!   - [`core::ledger`] - Input/output matching and running balance
//!   - [`core::traits`] - Seams for the node and the reputation service
//! - [`io`] - Settings, RPC and reputation clients, CSV export
//! - [`report`] - Table and flow diagram layout, PDF rendering
//! - [`pipeline`] - One run from connection to written report
//!
//! # Entry Types
//!
//! - **Deposit**: an output paying the target address; the balance goes up
//! - **Withdrawal**: an input spending from the target address; the balance goes down
//!
//! Entries are kept in discovery order: block height, transaction order within
//! the block, inputs before outputs. Every entry carries the running balance
//! after it was applied.
//!
//! # Scan Gaps
//!
//! Blocks and transactions the node fails to return are skipped and recorded as
//! [`types::ScanGap`]s. They are logged and listed in the report, since a gap
//! means the ledger may be incomplete.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod types;

pub use core::{ChainScanner, ChainSource, LedgerBuilder, ReputationSource};
pub use io::{write_ledger_csv, Settings};
pub use pipeline::{run, run_with, ReportSummary};
pub use types::{
    AddressReputation, AppError, Direction, Ledger, LedgerEntry, RawTransaction, ScanGap,
};
