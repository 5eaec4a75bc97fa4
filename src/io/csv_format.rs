//! CSV export of the ledger
//!
//! Writes one row per ledger entry in discovery order with columns:
//! txid, type, amount, address, balance, time, height.
//!
//! Amounts and balances are written with 8 decimal places (satoshi precision).

use crate::types::{LedgerEntry, ReportError};
use std::io::Write;

/// Header row of the ledger export
pub const LEDGER_HEADER: [&str; 7] = ["txid", "type", "amount", "address", "balance", "time", "height"];

/// Format an amount with satoshi precision
pub fn format_btc(amount: rust_decimal::Decimal) -> String {
    format!("{:.8}", amount)
}

/// Write ledger entries to CSV format
///
/// Entries are written in the order given; the ledger order is the discovery
/// order and is preserved as-is.
///
/// # Arguments
///
/// * `entries` - Ledger entries to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(ReportError::Csv)` if a write error occurred
pub fn write_ledger_csv(entries: &[LedgerEntry], output: &mut dyn Write) -> Result<(), ReportError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer.write_record(LEDGER_HEADER)?;

    for entry in entries {
        writer.write_record(&[
            entry.txid.clone(),
            entry.direction.to_string(),
            format_btc(entry.amount),
            entry.counterparty.clone(),
            format_btc(entry.balance),
            entry.formatted_time(),
            entry.height.to_string(),
        ])?;
    }

    writer.flush().map_err(|e| ReportError::Csv {
        message: format!("Failed to flush output: {}", e),
    })?;

    Ok(())
}
