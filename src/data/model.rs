use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Direction – the Import_Export column
// ---------------------------------------------------------------------------

/// Whether a transaction is an import or an export.
///
/// The source column is free text; anything outside the expected domain is
/// kept verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Direction {
    Import,
    Export,
    Other(String),
}

impl Direction {
    /// Interpret a raw `Import_Export` cell. Surrounding whitespace is ignored,
    /// case is not.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Import" => Direction::Import,
            "Export" => Direction::Export,
            other => Direction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Direction::Import => "Import",
            Direction::Export => "Export",
            Direction::Other(s) => s,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RawRecord – a source row before date normalization
// ---------------------------------------------------------------------------

/// The four required columns of one source row, as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based data row in the source (header excluded).
    pub row: usize,
    pub category: String,
    pub direction: Direction,
    pub value: f64,
    /// Unparsed `DD-MM-YYYY` text.
    pub date: String,
}

// ---------------------------------------------------------------------------
// Transaction – one normalized row
// ---------------------------------------------------------------------------

/// A single trade transaction with its derived calendar fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub category: String,
    pub direction: Direction,
    pub value: f64,
    pub date: NaiveDate,
    pub year: i32,
    /// Calendar month, 1–12.
    pub month: u32,
}

impl Transaction {
    /// Build a transaction, deriving `year` and `month` from `date`.
    pub fn new(
        category: impl Into<String>,
        direction: Direction,
        value: f64,
        date: NaiveDate,
    ) -> Self {
        Transaction {
            category: category.into(),
            direction,
            value,
            year: date.year(),
            month: date.month(),
            date,
        }
    }
}

// ---------------------------------------------------------------------------
// TradeDataset – the sampled, read-only table
// ---------------------------------------------------------------------------

/// The sampled dataset plus the distinct values each filter can offer.
///
/// Filter options come from the sample, never from the full source.
#[derive(Debug, Clone, Default)]
pub struct TradeDataset {
    transactions: Vec<Transaction>,
    categories: BTreeSet<String>,
    directions: BTreeSet<Direction>,
    years: BTreeSet<i32>,
    /// Row count of the source before sampling.
    source_rows: usize,
    /// Sampled rows dropped because their date did not parse.
    skipped_rows: usize,
}

impl TradeDataset {
    /// Build the option indices from the normalized transactions.
    pub fn from_transactions(
        transactions: Vec<Transaction>,
        source_rows: usize,
        skipped_rows: usize,
    ) -> Self {
        let mut categories = BTreeSet::new();
        let mut directions = BTreeSet::new();
        let mut years = BTreeSet::new();

        for tx in &transactions {
            categories.insert(tx.category.clone());
            directions.insert(tx.direction.clone());
            years.insert(tx.year);
        }

        TradeDataset {
            transactions,
            categories,
            directions,
            years,
            source_rows,
            skipped_rows,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn directions(&self) -> &BTreeSet<Direction> {
        &self.directions
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Number of sampled transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
