use chrono::NaiveDate;

use super::model::{RawRecord, Transaction};
use crate::error::ParseError;

/// Source date format, day-month-year.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// What to do with a row whose date does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Abort the whole load with a [`ParseError`].
    #[default]
    Strict,
    /// Drop the row and log a warning.
    SkipInvalid,
}

/// Result of normalizing a batch of raw rows.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub transactions: Vec<Transaction>,
    /// Rows dropped under [`DatePolicy::SkipInvalid`].
    pub skipped: Vec<ParseError>,
}

pub fn parse_date(raw: &str, row: usize) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|source| ParseError {
        row,
        value: raw.to_string(),
        source,
    })
}

/// Parse every record's date and attach Year and Month.
pub fn normalize(records: Vec<RawRecord>, policy: DatePolicy) -> Result<Normalized, ParseError> {
    let mut out = Normalized {
        transactions: Vec::with_capacity(records.len()),
        skipped: Vec::new(),
    };

    for rec in records {
        match parse_date(&rec.date, rec.row) {
            Ok(date) => out
                .transactions
                .push(Transaction::new(rec.category, rec.direction, rec.value, date)),
            Err(e) => match policy {
                DatePolicy::Strict => return Err(e),
                DatePolicy::SkipInvalid => {
                    log::warn!("Skipping {e}");
                    out.skipped.push(e);
                }
            },
        }
    }

    Ok(out)
}
