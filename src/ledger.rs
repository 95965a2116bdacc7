use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::InvoiceDocument;
use crate::numbering::InvoiceCounter;
use crate::tax::round2;

/// One saved invoice, in ledger column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "S.No")]
    pub sequence: u64,
    #[serde(rename = "Invoice No")]
    pub identifier: String,
    #[serde(rename = "Date")]
    pub issue_date: String,
    #[serde(rename = "Due Date")]
    pub due_date: String,
    #[serde(rename = "Client Name")]
    pub billed_to: String,
    #[serde(rename = "Subtotal")]
    pub subtotal: f64,
    #[serde(rename = "CGST")]
    pub cgst: f64,
    #[serde(rename = "SGST")]
    pub sgst: f64,
    #[serde(rename = "IGST")]
    pub igst: f64,
    #[serde(rename = "Grand Total")]
    pub grand_total: f64,
}

impl LedgerRow {
    pub fn for_invoice(sequence: u64, doc: &InvoiceDocument) -> Self {
        let t = &doc.totals;
        Self {
            sequence,
            identifier: doc.identifier.clone(),
            issue_date: doc.issue_date.format("%Y-%m-%d").to_string(),
            due_date: doc.due_date.format("%Y-%m-%d").to_string(),
            billed_to: doc.billed_to.name.clone(),
            subtotal: round2(t.subtotal),
            cgst: round2(t.cgst),
            sgst: round2(t.sgst),
            igst: round2(t.igst),
            grand_total: round2(t.grand_total),
        }
    }
}

/// Persistent record of saved invoices.
pub trait Ledger {
    fn rows(&self) -> Result<Vec<LedgerRow>, Error>;

    fn append(&mut self, row: &LedgerRow) -> Result<(), Error>;

    fn last_identifier(&self) -> Result<Option<String>, Error> {
        Ok(self
            .rows()?
            .into_iter()
            .next_back()
            .map(|r| r.identifier)
            .filter(|id| !id.trim().is_empty()))
    }

    fn next_sequence(&self) -> Result<u64, Error> {
        Ok(self.rows()?.len() as u64 + 1)
    }
}

/// Seeds a session counter from the ledger. An unreadable ledger seeds the
/// default identifier rather than blocking invoicing.
pub fn seed_counter(ledger: &dyn Ledger) -> InvoiceCounter {
    match ledger.last_identifier() {
        Ok(last) => InvoiceCounter::seed(last.as_deref()),
        Err(e) => {
            log::warn!("Could not read last invoice number: {e}");
            InvoiceCounter::seed(None)
        }
    }
}

/// Appends `doc` to the ledger and only then advances `counter`. On failure
/// the counter is left as it was.
pub fn save_invoice(
    ledger: &mut dyn Ledger,
    counter: &mut InvoiceCounter,
    doc: &InvoiceDocument,
) -> Result<LedgerRow, Error> {
    let row = LedgerRow::for_invoice(ledger.next_sequence()?, doc);
    ledger
        .append(&row)
        .map_err(|e| Error::Ledger(e.to_string()))?;
    counter.advance_past(&doc.identifier);
    log::info!(
        "Saved invoice {} (S.No {}), next number {}",
        row.identifier,
        row.sequence,
        counter.current()
    );
    Ok(row)
}

/// Ledger stored as a CSV file with a header row.
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ledger for CsvLedger {
    fn rows(&self) -> Result<Vec<LedgerRow>, Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<LedgerRow>, _>>()?;
        Ok(rows)
    }

    fn append(&mut self, row: &LedgerRow) -> Result<(), Error> {
        let needs_header = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    rows: Vec<LedgerRow>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for MemoryLedger {
    fn rows(&self) -> Result<Vec<LedgerRow>, Error> {
        Ok(self.rows.clone())
    }

    fn append(&mut self, row: &LedgerRow) -> Result<(), Error> {
        self.rows.push(row.clone());
        Ok(())
    }
}
