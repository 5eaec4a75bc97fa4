//! Report module
//!
//! Turns a finished ledger into the report artifacts.
//!
//! # Components
//!
//! - `table` - Paginated table model for transactions, reputations and scan gaps
//! - `flow` - Directed flow diagram model, one edge per ledger entry
//! - `pdf` - Rendering of both models with `printpdf`
//!
//! Layout is decided by the pure models; `pdf` only places text and lines.

pub mod flow;
pub mod pdf;
pub mod table;

pub use flow::{FlowDiagram, FlowEdge};
pub use table::{Table, TablePage};

use crate::io::csv_format::write_ledger_csv;
use crate::types::{AddressReputation, Ledger, ReportError, ScanGap};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Everything that goes into one report
#[derive(Debug, Clone, Copy)]
pub struct ReportContent<'a> {
    pub ledger: &'a Ledger,
    pub reputations: &'a [AddressReputation],
    pub gaps: &'a [ScanGap],
}

impl ReportContent<'_> {
    /// Tables in page order: transactions, then reputations and scan gaps when present
    pub fn tables(&self) -> Vec<Table> {
        let mut tables = vec![Table::transactions(self.ledger, self.gaps.len())];
        if !self.reputations.is_empty() {
            tables.push(Table::reputations(self.reputations));
        }
        if !self.gaps.is_empty() {
            tables.push(Table::gaps(self.gaps));
        }
        tables
    }

    pub fn flow(&self) -> FlowDiagram {
        FlowDiagram::from_entries(&self.ledger.target, &self.ledger.entries)
    }
}

/// Write the PDF report and the CSV ledger export
///
/// Both parent directories must already exist.
///
/// # Arguments
///
/// * `content` - Ledger, reputation rows and scan gaps to render
/// * `pdf_path` - Destination of the PDF report
/// * `csv_path` - Destination of the CSV ledger export
///
/// # Returns
///
/// * `Ok(pages)` - number of PDF pages written
/// * `Err(ReportError)` - if either file could not be created or rendered
pub fn write_report(
    content: &ReportContent<'_>,
    pdf_path: &Path,
    csv_path: &Path,
) -> Result<usize, ReportError> {
    let tables = content.tables();
    let flow = content.flow();
    let title = format!("Address report for {}", content.ledger.target);
    let flow_title = format!("Fund flow for {}", content.ledger.target);

    let pages = pdf::write_pdf(pdf_path, &title, &tables, &flow, &flow_title)?;
    info!(path = %pdf_path.display(), pages, edges = flow.edges.len(), "Wrote PDF report");

    let file = File::create(csv_path).map_err(|e| ReportError::io(csv_path, e))?;
    let mut writer = BufWriter::new(file);
    write_ledger_csv(&content.ledger.entries, &mut writer)?;
    info!(path = %csv_path.display(), entries = content.ledger.entries.len(), "Wrote CSV ledger");

    Ok(pages)
}
