//! Ledger building
//!
//! This module provides the `LedgerBuilder` which turns the transactions fed to
//! it by the scanner into ledger entries for one target address.
//!
//! The LedgerBuilder is responsible for:
//! - Matching transaction inputs and outputs against the target address
//! - Maintaining the running balance with checked arithmetic
//! - Appending entries in discovery order (inputs before outputs)
//! - Collecting every counterparty address seen

use crate::types::{Direction, Ledger, LedgerEntry, LedgerError, RawTransaction};
use chrono::DateTime;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Match one transaction against the target address
///
/// Every input spending from the target yields a Withdrawal; every output whose
/// destination list contains the target yields a Deposit recorded against the
/// first listed destination address. Inputs and outputs without an address or
/// a value are ignored. Nothing is merged: a transaction paying the target
/// twice yields two entries.
///
/// # Arguments
///
/// * `tx` - The decoded transaction
/// * `height` - Height of the block holding the transaction
/// * `target` - The address whose history is being reconstructed
/// * `balance` - Running balance before this transaction
///
/// # Returns
///
/// The new entries (each carrying its running balance) and the updated balance.
///
/// # Errors
///
/// Returns `LedgerError::ArithmeticOverflow` if the balance would overflow.
pub fn match_transaction(
    tx: &RawTransaction,
    height: u64,
    target: &str,
    balance: Decimal,
) -> Result<(Vec<LedgerEntry>, Decimal), LedgerError> {
    let timestamp = tx
        .timestamp()
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    let mut balance = balance;
    let mut entries = Vec::new();

    for input in &tx.vin {
        let (Some(address), Some(value)) = (input.source_address(), input.spent_value()) else {
            continue;
        };
        if address != target {
            continue;
        }

        balance = apply(balance, Direction::Withdrawal, value, &tx.txid)?;
        entries.push(LedgerEntry {
            txid: tx.txid.clone(),
            height,
            direction: Direction::Withdrawal,
            amount: value,
            counterparty: address.to_string(),
            balance,
            timestamp,
        });
    }

    for output in &tx.vout {
        let destinations = output.destination_addresses();
        let Some(value) = output.value else {
            continue;
        };
        if !destinations.contains(&target) {
            continue;
        }

        balance = apply(balance, Direction::Deposit, value, &tx.txid)?;
        entries.push(LedgerEntry {
            txid: tx.txid.clone(),
            height,
            direction: Direction::Deposit,
            amount: value,
            // contains() above guarantees at least one destination
            counterparty: destinations[0].to_string(),
            balance,
            timestamp,
        });
    }

    Ok((entries, balance))
}

fn apply(
    balance: Decimal,
    direction: Direction,
    amount: Decimal,
    txid: &str,
) -> Result<Decimal, LedgerError> {
    let next = match direction {
        Direction::Deposit => balance.checked_add(amount),
        Direction::Withdrawal => balance.checked_sub(amount),
    };
    next.ok_or_else(|| LedgerError::ArithmeticOverflow {
        txid: txid.to_string(),
        direction: direction.to_string(),
    })
}

/// Accumulates the ledger of one target address
///
/// Owns the running balance, the append-only entry list and the address set.
/// Entries are never revised or removed once appended.
pub struct LedgerBuilder {
    target: String,
    balance: Decimal,
    entries: Vec<LedgerEntry>,
    addresses: BTreeSet<String>,
}

impl LedgerBuilder {
    /// Create a builder with a zero balance
    ///
    /// The address set starts out holding the target itself.
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        let mut addresses = BTreeSet::new();
        addresses.insert(target.clone());

        LedgerBuilder {
            target,
            balance: Decimal::ZERO,
            entries: Vec::new(),
            addresses,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn addresses(&self) -> &BTreeSet<String> {
        &self.addresses
    }

    /// Apply one transaction to the ledger
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - number of entries appended (zero when nothing matched)
    /// * `Err(LedgerError)` - the balance would overflow; the ledger is left
    ///   exactly as it was before the call
    pub fn apply(&mut self, height: u64, tx: &RawTransaction) -> Result<usize, LedgerError> {
        let (new_entries, balance) = match_transaction(tx, height, &self.target, self.balance)?;
        let appended = new_entries.len();

        for entry in &new_entries {
            self.addresses.insert(entry.counterparty.clone());
        }
        self.entries.extend(new_entries);
        self.balance = balance;

        Ok(appended)
    }

    /// Finish building and hand the ledger over
    pub fn into_ledger(self) -> Ledger {
        Ledger {
            target: self.target,
            entries: self.entries,
            addresses: self.addresses,
            balance: self.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Prevout, ScriptPubKey, TxInput, TxOutput};
    use rstest::rstest;
    use std::str::FromStr;

    const TARGET: &str = "bc1qtarget";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input_from(address: &str, value: &str) -> TxInput {
        TxInput {
            txid: Some("prev".to_string()),
            prevout: Some(Prevout {
                value: Some(dec(value)),
                script_pub_key: ScriptPubKey {
                    address: Some(address.to_string()),
                    ..Default::default()
                },
            }),
            ..Default::default()
        }
    }

    fn output_to(addresses: &[&str], value: &str) -> TxOutput {
        TxOutput {
            value: Some(dec(value)),
            n: None,
            script_pub_key: ScriptPubKey {
                addresses: Some(addresses.iter().map(|a| a.to_string()).collect()),
                ..Default::default()
            },
        }
    }

    fn tx(txid: &str, vin: Vec<TxInput>, vout: Vec<TxOutput>) -> RawTransaction {
        RawTransaction {
            txid: txid.to_string(),
            time: Some(1_600_000_000),
            blocktime: None,
            vin,
            vout,
        }
    }

    #[test]
    fn test_new_builder_is_empty() {
        let builder = LedgerBuilder::new(TARGET);
        assert_eq!(builder.balance(), Decimal::ZERO);
        assert!(builder.entries().is_empty());
        assert_eq!(builder.addresses().len(), 1);
        assert!(builder.addresses().contains(TARGET));
    }

    #[test]
    fn test_deposit_increments_balance() {
        let mut builder = LedgerBuilder::new(TARGET);
        let appended = builder
            .apply(1, &tx("a", vec![], vec![output_to(&[TARGET], "0.5")]))
            .unwrap();

        assert_eq!(appended, 1);
        let entry = &builder.entries()[0];
        assert_eq!(entry.direction, Direction::Deposit);
        assert_eq!(entry.amount, dec("0.5"));
        assert_eq!(entry.balance, dec("0.5"));
        assert_eq!(entry.counterparty, TARGET);
        assert_eq!(entry.height, 1);
        assert_eq!(entry.formatted_time(), "2020-09-13 12:26:40");
    }

    #[test]
    fn test_withdrawal_decrements_balance_below_zero() {
        let mut builder = LedgerBuilder::new(TARGET);
        builder
            .apply(3, &tx("b", vec![input_from(TARGET, "0.2")], vec![]))
            .unwrap();

        let entry = &builder.entries()[0];
        assert_eq!(entry.direction, Direction::Withdrawal);
        assert_eq!(entry.amount, dec("0.2"));
        assert_eq!(entry.balance, dec("-0.2"));
    }

    #[test]
    fn test_round_trip_balances() {
        let mut builder = LedgerBuilder::new(TARGET);
        builder
            .apply(1, &tx("in", vec![input_from("1Other", "1")], vec![output_to(&[TARGET], "0.5")]))
            .unwrap();
        builder
            .apply(2, &tx("out", vec![input_from(TARGET, "0.2")], vec![output_to(&["1Other"], "0.19")]))
            .unwrap();

        let balances: Vec<Decimal> = builder.entries().iter().map(|e| e.balance).collect();
        assert_eq!(balances, vec![dec("0.5"), dec("0.3")]);
        assert_eq!(builder.balance(), dec("0.3"));
    }

    #[test]
    fn test_two_matching_outputs_are_not_merged() {
        let mut builder = LedgerBuilder::new(TARGET);
        let appended = builder
            .apply(
                1,
                &tx(
                    "batch",
                    vec![],
                    vec![output_to(&[TARGET], "0.1"), output_to(&[TARGET], "0.2")],
                ),
            )
            .unwrap();

        assert_eq!(appended, 2);
        assert_eq!(builder.entries()[0].balance, dec("0.1"));
        assert_eq!(builder.entries()[1].balance, dec("0.3"));
        assert!(builder.entries().iter().all(|e| e.txid == "batch"));
    }

    #[test]
    fn test_inputs_are_recorded_before_outputs() {
        let mut builder = LedgerBuilder::new(TARGET);
        builder
            .apply(
                1,
                &tx(
                    "self",
                    vec![input_from(TARGET, "1")],
                    vec![output_to(&["1Other"], "0.4"), output_to(&[TARGET], "0.6")],
                ),
            )
            .unwrap();

        let directions: Vec<Direction> =
            builder.entries().iter().map(|e| e.direction).collect();
        assert_eq!(directions, vec![Direction::Withdrawal, Direction::Deposit]);
        assert_eq!(builder.balance(), dec("-0.4"));
    }

    #[test]
    fn test_deposit_counterparty_is_first_listed_destination() {
        let mut builder = LedgerBuilder::new(TARGET);
        builder
            .apply(1, &tx("multisig", vec![], vec![output_to(&["1Cosigner", TARGET], "2")]))
            .unwrap();

        assert_eq!(builder.entries()[0].counterparty, "1Cosigner");
        assert!(builder.addresses().contains("1Cosigner"));
    }

    #[rstest]
    #[case::coinbase_input(TxInput { coinbase: Some("04ff".to_string()), ..Default::default() }, TxOutput::default())]
    #[case::input_without_value(
        TxInput { addr: Some(TARGET.to_string()), ..Default::default() },
        TxOutput::default()
    )]
    #[case::nonstandard_output(
        TxInput::default(),
        TxOutput { value: Some(Decimal::ONE), n: Some(0), script_pub_key: ScriptPubKey { script_type: Some("nonstandard".to_string()), ..Default::default() } }
    )]
    #[case::other_addresses(
        TxInput { addr: Some("1Other".to_string()), value: Some(Decimal::ONE), ..Default::default() },
        TxOutput { value: Some(Decimal::ONE), n: Some(0), script_pub_key: ScriptPubKey { address: Some("1Else".to_string()), ..Default::default() } }
    )]
    fn test_unmatched_or_addressless_parts_are_ignored(
        #[case] input: TxInput,
        #[case] output: TxOutput,
    ) {
        let mut builder = LedgerBuilder::new(TARGET);
        let appended = builder.apply(1, &tx("x", vec![input], vec![output])).unwrap();

        assert_eq!(appended, 0);
        assert_eq!(builder.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_balance_is_prefix_sum_of_signed_amounts() {
        let mut builder = LedgerBuilder::new(TARGET);
        let txs = vec![
            tx("1", vec![], vec![output_to(&[TARGET], "1.25")]),
            tx("2", vec![input_from(TARGET, "0.75")], vec![output_to(&[TARGET], "0.1")]),
            tx("3", vec![], vec![output_to(&[TARGET], "0.00000001")]),
            tx("4", vec![input_from(TARGET, "3")], vec![]),
        ];
        for (height, t) in txs.iter().enumerate() {
            builder.apply(height as u64, t).unwrap();
        }

        let mut running = Decimal::ZERO;
        for entry in builder.entries() {
            running += entry.signed_amount();
            assert_eq!(entry.balance, running);
        }

        let ledger = builder.into_ledger();
        assert_eq!(
            ledger.balance,
            ledger.total_deposited() - ledger.total_withdrawn()
        );
        assert_eq!(ledger.balance, dec("-2.39999999"));
    }

    #[test]
    fn test_overflow_leaves_ledger_untouched() {
        let mut builder = LedgerBuilder::new(TARGET);
        builder
            .apply(1, &tx("big", vec![], vec![output_to(&[TARGET], "1")]))
            .unwrap();

        let overflow = tx(
            "huge",
            vec![],
            vec![TxOutput {
                value: Some(Decimal::MAX),
                n: Some(0),
                script_pub_key: ScriptPubKey {
                    address: Some(TARGET.to_string()),
                    ..Default::default()
                },
            }],
        );
        let result = builder.apply(2, &overflow);

        assert!(matches!(result, Err(LedgerError::ArithmeticOverflow { .. })));
        assert_eq!(builder.entries().len(), 1);
        assert_eq!(builder.balance(), Decimal::ONE);
    }
}
