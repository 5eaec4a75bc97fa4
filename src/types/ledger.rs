//! Ledger types for the address history
//!
//! This module defines the entries recorded for the target address, the final
//! ledger handed to the report stage, and the gaps left by units the scanner
//! could not fetch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fmt;

/// Direction of a fund movement relative to the target address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Funds received by the target address (a matched output)
    Deposit,

    /// Funds spent by the target address (a matched input)
    Withdrawal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Deposit => write!(f, "Deposit"),
            Direction::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

/// One recorded Deposit or Withdrawal for the target address
///
/// Entries are immutable once appended to the ledger. `balance` is the running
/// balance after this entry has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Id of the transaction the entry was found in
    pub txid: String,

    /// Height of the block holding the transaction
    pub height: u64,

    pub direction: Direction,

    /// Moved amount (never negative; the sign comes from `direction`)
    pub amount: Decimal,

    /// Address on the other side of the matched input/output
    pub counterparty: String,

    /// Running balance after this entry
    pub balance: Decimal,

    pub timestamp: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Amount with the sign of its effect on the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Deposit => self.amount,
            Direction::Withdrawal => -self.amount,
        }
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS` (UTC), or empty when unknown
    pub fn formatted_time(&self) -> String {
        self.timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Complete history reconstructed for one target address
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub target: String,

    /// Entries in discovery order
    pub entries: Vec<LedgerEntry>,

    /// Target plus every counterparty seen, never pruned
    pub addresses: BTreeSet<String>,

    /// Final running balance
    pub balance: Decimal,
}

impl Ledger {
    pub fn total_deposited(&self) -> Decimal {
        self.sum_of(Direction::Deposit)
    }

    pub fn total_withdrawn(&self) -> Decimal {
        self.sum_of(Direction::Withdrawal)
    }

    fn sum_of(&self, direction: Direction) -> Decimal {
        self.entries
            .iter()
            .filter(|entry| entry.direction == direction)
            .map(|entry| entry.amount)
            .sum()
    }
}

/// A block or transaction the scanner had to skip
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGap {
    pub height: u64,

    /// Known when the hash lookup succeeded
    pub block_hash: Option<String>,

    /// Set when a single transaction failed rather than the whole block
    pub txid: Option<String>,

    pub reason: String,
}

impl ScanGap {
    /// Short description of the unit that is missing
    pub fn unit(&self) -> String {
        match (&self.txid, &self.block_hash) {
            (Some(txid), _) => format!("transaction {}", txid),
            (None, Some(hash)) => format!("block {}", hash),
            (None, None) => format!("block at height {}", self.height),
        }
    }
}
