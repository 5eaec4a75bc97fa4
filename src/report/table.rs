//! Table layout for the report pages
//!
//! Tables are plain rows of strings. Pagination and column sizing are computed
//! here so the PDF writer only has to place text.

use crate::io::csv_format::format_btc;
use crate::types::{AddressReputation, Ledger, ScanGap};

/// Points to millimetres
pub const PT_TO_MM: f32 = 0.352_778;

/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH_EM: f32 = 0.6;

/// Horizontal padding on each side of a cell
pub const CELL_PADDING_MM: f32 = 1.5;

/// Smallest font a table is shrunk to when its columns do not fit
pub const MIN_FONT_SIZE: f32 = 4.0;

const MAX_CELL_CHARS: usize = 96;

/// A titled table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,

    /// Line printed under the title on the first page only
    pub subtitle: Option<String>,

    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One page worth of a table
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a> {
    pub title: String,
    pub subtitle: Option<&'a str>,
    pub header: &'a [String],
    pub rows: &'a [Vec<String>],
}

impl Table {
    /// Row-per-entry transaction table
    pub fn transactions(ledger: &Ledger, gap_count: usize) -> Self {
        let rows = ledger
            .entries
            .iter()
            .map(|entry| {
                vec![
                    entry.txid.clone(),
                    entry.direction.to_string(),
                    format_btc(entry.amount),
                    entry.counterparty.clone(),
                    format_btc(entry.balance),
                    entry.formatted_time(),
                ]
            })
            .collect();

        Table {
            title: format!("Transactions for {}", ledger.target),
            subtitle: Some(format!(
                "Entries: {}   Deposited: {} BTC   Withdrawn: {} BTC   Balance: {} BTC   Scan gaps: {}",
                ledger.entries.len(),
                format_btc(ledger.total_deposited()),
                format_btc(ledger.total_withdrawn()),
                format_btc(ledger.balance),
                gap_count
            )),
            header: header(&[
                "Transaction ID",
                "Type",
                "Amount (BTC)",
                "Address",
                "Balance (BTC)",
                "Time",
            ]),
            rows,
        }
    }

    /// Address reputation table
    pub fn reputations(reputations: &[AddressReputation]) -> Self {
        let rows = reputations
            .iter()
            .map(|r| {
                vec![
                    r.address.clone(),
                    r.report_count.to_string(),
                    r.first_seen.clone().unwrap_or_default(),
                    r.last_seen.clone().unwrap_or_default(),
                ]
            })
            .collect();

        Table {
            title: "Address reputation".to_string(),
            subtitle: None,
            header: header(&["Address", "Reports", "First seen", "Last seen"]),
            rows,
        }
    }

    /// Units the scanner could not fetch
    pub fn gaps(gaps: &[ScanGap]) -> Self {
        let rows = gaps
            .iter()
            .map(|gap| vec![gap.height.to_string(), gap.unit(), truncate(&gap.reason)])
            .collect();

        Table {
            title: "Scan gaps".to_string(),
            subtitle: Some(
                "These units could not be fetched; the ledger may be incomplete.".to_string(),
            ),
            header: header(&["Height", "Unit", "Reason"]),
            rows,
        }
    }

    /// Split the table into pages of at most `rows_per_page` rows
    ///
    /// An empty table still yields one page holding the header.
    pub fn pages(&self, rows_per_page: usize) -> Vec<TablePage<'_>> {
        let rows_per_page = rows_per_page.max(1);
        let chunks: Vec<&[Vec<String>]> = if self.rows.is_empty() {
            vec![&self.rows[..]]
        } else {
            self.rows.chunks(rows_per_page).collect()
        };
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, rows)| TablePage {
                title: if total > 1 {
                    format!("{} (page {} of {})", self.title, index + 1, total)
                } else {
                    self.title.clone()
                },
                subtitle: if index == 0 {
                    self.subtitle.as_deref()
                } else {
                    None
                },
                header: &self.header,
                rows,
            })
            .collect()
    }

    /// Column widths in millimetres at `font_size` points
    ///
    /// Each column is as wide as its longest cell (header included).
    pub fn column_widths(&self, font_size: f32) -> Vec<f32> {
        let char_width = font_size * GLYPH_WIDTH_EM * PT_TO_MM;

        (0..self.header.len())
            .map(|column| {
                let longest = std::iter::once(&self.header)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                longest as f32 * char_width + 2.0 * CELL_PADDING_MM
            })
            .collect()
    }

    /// Largest font size up to `base` at which all columns fit in `available_mm`
    pub fn fitted_font_size(&self, base: f32, available_mm: f32) -> f32 {
        let total: f32 = self.column_widths(base).iter().sum();
        if total <= available_mm {
            return base;
        }

        let padding = 2.0 * CELL_PADDING_MM * self.header.len() as f32;
        let text_width = total - padding;
        if text_width <= 0.0 {
            return base;
        }
        let scaled = base * (available_mm - padding).max(0.0) / text_width;
        scaled.clamp(MIN_FONT_SIZE, base)
    }
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }
    let mut short: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
    short.push_str("...");
    short
}
