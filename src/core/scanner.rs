//! Chain scanner
//!
//! This module provides the `ChainScanner` which walks every block height from
//! genesis to the tip and hands each transaction, in chain order, to a visitor.
//!
//! Fetch failures never abort the scan. A block hash, block body or transaction
//! that cannot be fetched is skipped and recorded as a [`ScanGap`], so the
//! caller can tell an empty history apart from an incomplete one.

use crate::core::traits::ChainSource;
use crate::types::{RawTransaction, ScanGap};
use tracing::{debug, info, warn};

/// Blocks between two progress log lines unless configured otherwise
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Summary of a completed scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    /// Blocks whose body was fetched
    pub blocks_scanned: u64,

    /// Transactions fetched and handed to the visitor
    pub transactions_scanned: u64,

    /// Units that could not be fetched, in scan order
    pub gaps: Vec<ScanGap>,
}

/// Sequential scanner over a [`ChainSource`]
pub struct ChainScanner<'a, C: ChainSource + ?Sized> {
    source: &'a C,
    progress_interval: u64,
}

impl<'a, C: ChainSource + ?Sized> ChainScanner<'a, C> {
    pub fn new(source: &'a C) -> Self {
        ChainScanner {
            source,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Log progress every `interval` blocks (0 is treated as 1)
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Scan heights `0..=tip`
    ///
    /// For each height the block hash is resolved, the block body fetched and
    /// every transaction in it fetched and passed to `visit` together with the
    /// block height. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Only errors returned by `visit` stop the scan; they are passed through
    /// unchanged.
    pub fn scan<F, E>(&self, tip: u64, mut visit: F) -> Result<ScanOutcome, E>
    where
        F: FnMut(u64, &RawTransaction) -> Result<(), E>,
    {
        let mut outcome = ScanOutcome::default();
        let total_blocks = tip + 1;

        info!(tip, "Analyzing the blockchain");

        for height in 0..=tip {
            self.scan_block(height, &mut outcome, &mut visit)?;

            let done = height + 1;
            if done % self.progress_interval == 0 || done == total_blocks {
                info!(
                    height,
                    tip,
                    progress = %format!("{:.1}%", done as f64 * 100.0 / total_blocks as f64),
                    gaps = outcome.gaps.len(),
                    "Scan progress"
                );
            }
        }

        Ok(outcome)
    }

    fn scan_block<F, E>(
        &self,
        height: u64,
        outcome: &mut ScanOutcome,
        visit: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(u64, &RawTransaction) -> Result<(), E>,
    {
        let hash = match self.source.block_hash(height) {
            Ok(hash) => hash,
            Err(e) => {
                record_gap(outcome, height, None, None, e.to_string());
                return Ok(());
            }
        };

        let block = match self.source.block(&hash) {
            Ok(block) => block,
            Err(e) => {
                record_gap(outcome, height, Some(&hash), None, e.to_string());
                return Ok(());
            }
        };
        outcome.blocks_scanned += 1;
        debug!(height, hash = %hash, txs = block.tx.len(), "Fetched block");

        for txid in &block.tx {
            match self.source.transaction(txid, &hash) {
                Ok(tx) => {
                    outcome.transactions_scanned += 1;
                    visit(height, &tx)?;
                }
                Err(e) => record_gap(outcome, height, Some(&hash), Some(txid), e.to_string()),
            }
        }

        Ok(())
    }
}

fn record_gap(
    outcome: &mut ScanOutcome,
    height: u64,
    block_hash: Option<&str>,
    txid: Option<&str>,
    reason: String,
) {
    let gap = ScanGap {
        height,
        block_hash: block_hash.map(str::to_string),
        txid: txid.map(str::to_string),
        reason,
    };
    warn!(height, unit = %gap.unit(), reason = %gap.reason, "Skipping unit that could not be fetched");
    outcome.gaps.push(gap);
}
