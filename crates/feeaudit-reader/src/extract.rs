//! Run / Agent Fee extraction from an `All Data` sheet
//!
//! The first row of the sheet's used range is the header. Cells arrive as
//! whatever Excel stored (text, integers, floats); they are normalized here
//! so the rest of the pipeline only sees `RunId` and `Decimal`.

use std::path::Path;

use calamine::{Data, Range};
use chrono::NaiveDate;
use feeaudit_core::{AuditError, FeeRecord, RunId, FEE_COLUMN, RUN_COLUMN};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::warn;

/// `1,234` or `-12,345.50`: commas only as thousands separators
static GROUPED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid grouped number regex"));

/// One run/fee pair, not yet dated
#[derive(Clone, Debug, PartialEq)]
pub struct RunFee {
    pub run: RunId,
    pub fee: Decimal,
    /// 1-based sheet row
    pub row: usize,
}

/// A row dropped because its fee could not be read as a number
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidFee {
    /// 1-based sheet row
    pub row: usize,
    pub value: String,
}

impl InvalidFee {
    pub fn to_error(&self) -> AuditError {
        AuditError::InvalidFeeValue {
            row: self.row,
            value: self.value.clone(),
        }
    }
}

/// Result of reading one report sheet
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    pub entries: Vec<RunFee>,
    pub invalid_rows: Vec<InvalidFee>,
    /// Rows skipped because the run or fee cell was blank
    pub blank_rows: usize,
}

impl Extraction {
    /// Attach the file-level date and source path to every entry
    pub fn into_records(self, date: NaiveDate, source: &Path) -> Vec<FeeRecord> {
        self.entries
            .into_iter()
            .map(|entry| FeeRecord::new(entry.run, entry.fee, date).source(source).row(entry.row))
            .collect()
    }
}

/// Extract run/fee pairs from a report sheet
///
/// Fails with `ColumnNotFound` when the header row lacks `Run` or
/// `Agent Fee`. Rows with an unreadable fee are dropped and listed in
/// [`Extraction::invalid_rows`].
pub fn extract_records(range: &Range<Data>) -> Result<Extraction, AuditError> {
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);

    let run_col = find_column(header, RUN_COLUMN)?;
    let fee_col = find_column(header, FEE_COLUMN)?;

    let mut extraction = Extraction::default();
    for (offset, cells) in rows.enumerate() {
        // header is sheet row first_row + 1, data starts one below it
        let row = first_row + offset + 2;
        let run_cell = cells.get(run_col).unwrap_or(&Data::Empty);
        let fee_cell = cells.get(fee_col).unwrap_or(&Data::Empty);

        if is_blank(run_cell) || is_blank(fee_cell) {
            extraction.blank_rows += 1;
            continue;
        }

        let Some(fee) = coerce_fee(fee_cell) else {
            let invalid = InvalidFee {
                row,
                value: fee_cell.to_string(),
            };
            warn!(error = %invalid.to_error(), "dropping row");
            extraction.invalid_rows.push(invalid);
            continue;
        };

        extraction.entries.push(RunFee {
            run: RunId::new(&run_label(run_cell)),
            fee,
            row,
        });
    }

    Ok(extraction)
}

fn find_column(header: &[Data], name: &str) -> Result<usize, AuditError> {
    header
        .iter()
        .position(|cell| matches!(cell, Data::String(s) if s == name))
        .ok_or_else(|| AuditError::ColumnNotFound {
            column: name.to_string(),
        })
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text form of a run cell; whole-number floats lose their `.0`
fn run_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Fee cell as a decimal
///
/// Floats go through their shortest round-trip text so `240.697` stays
/// `240.697` instead of its binary expansion. Text may group thousands with
/// commas; any other comma (`12,5`, `1,2,3`) makes the value invalid.
pub(crate) fn coerce_fee(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Int(n) => Some(Decimal::from(*n)),
        Data::Float(n) if n.is_finite() => n.to_string().parse().ok(),
        Data::String(s) => parse_fee_text(s.trim()),
        _ => None,
    }
}

fn parse_fee_text(text: &str) -> Option<Decimal> {
    if !text.contains(',') {
        return text.parse().ok();
    }
    if !GROUPED_NUMBER.is_match(text) {
        return None;
    }
    text.replace(',', "").parse().ok()
}
