//! Pipeline module
//!
//! Wires the stages together for one run: connect, scan and build the ledger,
//! look up reputations, write the report. Stages run strictly one after the
//! other.

mod reputation;

pub use reputation::{lookup_reputations, ReputationLookup};

use crate::core::{ChainScanner, ChainSource, LedgerBuilder};
use crate::io::{ReputationClient, RpcClient, RpcConfig, Settings};
use crate::report::{write_report, ReportContent};
use crate::types::{AppError, ReportError, ScanGap};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, warn};

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub report_path: PathBuf,
    pub csv_path: PathBuf,
    pub entries: usize,
    pub balance: Decimal,
    pub pages: usize,
    pub reputations: usize,
    pub gaps: Vec<ScanGap>,
}

/// Run against the node described by `settings`
///
/// # Errors
///
/// * `AppError::Connection` - the client could not be built or `getblockcount` failed
/// * any error from [`run_with`]
pub fn run(settings: &Settings) -> Result<ReportSummary, AppError> {
    let client = RpcClient::new(RpcConfig::from_settings(settings)).map_err(AppError::Connection)?;
    let tip = client.block_count().map_err(AppError::Connection)?;
    info!(url = %settings.rpc_url(), tip, "Connected to the RPC server");

    let reputation_client = ReputationClient::from_settings(settings);
    let reputation = match &reputation_client {
        Ok(Some(client)) => ReputationLookup::Source(client),
        Ok(None) => ReputationLookup::NoApiKey,
        Err(e) => ReputationLookup::Unavailable(e.to_string()),
    };

    run_with(settings, &client, tip, reputation)
}

/// Run the scan and report stages against any chain source
///
/// Heights `0..=tip` are scanned. The output directory is created when it
/// does not exist yet.
///
/// # Arguments
///
/// * `settings` - Target address, output directory and scan options
/// * `chain` - Source of blocks and transactions
/// * `tip` - Last height to scan
/// * `reputation` - Reputation source, or the reason the lookup is skipped
///
/// # Errors
///
/// * `AppError::Ledger` - the running balance overflowed
/// * `AppError::Report` - the output directory or a report file could not be written
pub fn run_with<C: ChainSource + ?Sized>(
    settings: &Settings,
    chain: &C,
    tip: u64,
    reputation: ReputationLookup<'_>,
) -> Result<ReportSummary, AppError> {
    let mut builder = LedgerBuilder::new(settings.address_to_search.as_str());
    let outcome = ChainScanner::new(chain)
        .with_progress_interval(settings.progress_interval)
        .scan(tip, |height, tx| builder.apply(height, tx).map(|_| ()))?;
    let ledger = builder.into_ledger();

    info!(
        blocks = outcome.blocks_scanned,
        transactions = outcome.transactions_scanned,
        entries = ledger.entries.len(),
        addresses = ledger.addresses.len(),
        balance = %ledger.balance,
        gaps = outcome.gaps.len(),
        "Scan complete"
    );
    if !outcome.gaps.is_empty() {
        warn!(gaps = outcome.gaps.len(), "The ledger may be incomplete");
    }

    let reputations = lookup_reputations(reputation, &ledger.addresses);

    std::fs::create_dir_all(&settings.output_path)
        .map_err(|e| ReportError::io(&settings.output_path, e))?;
    let report_path = settings.report_path();
    let csv_path = settings.csv_path();
    let content = ReportContent {
        ledger: &ledger,
        reputations: &reputations,
        gaps: &outcome.gaps,
    };
    let pages = write_report(&content, &report_path, &csv_path)?;

    Ok(ReportSummary {
        report_path,
        csv_path,
        entries: ledger.entries.len(),
        balance: ledger.balance,
        pages,
        reputations: reputations.len(),
        gaps: outcome.gaps,
    })
}
