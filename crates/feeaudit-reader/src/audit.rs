//! Read a rendered audit workbook back into an [`AggregateTable`]
//!
//! Blocks are found by their `Run <id> Audit` title row. The next row that
//! starts with `Contract Name` holds the dates and the row after it the
//! fees; blank fee cells are absent pairs.

use std::path::Path;

use calamine::{Data, Range};
use chrono::NaiveDate;
use feeaudit_core::{parse_block_title, AggregateTable, AuditError, AUDIT_SHEET, CONTRACT_HEADER};

use crate::extract::coerce_fee;
use crate::workbook::read_sheet;

/// Parse the audit sheet of the workbook at `path`
pub fn read_audit(path: &Path) -> Result<AggregateTable, AuditError> {
    let range = read_sheet(path, AUDIT_SHEET)?;
    parse_audit_blocks(&range)
}

/// Parse stacked audit blocks from a sheet
pub fn parse_audit_blocks(range: &Range<Data>) -> Result<AggregateTable, AuditError> {
    let rows: Vec<&[Data]> = range.rows().collect();
    let mut table = AggregateTable::new();

    let mut index = 0;
    while index < rows.len() {
        let Some(run) = first_text(rows[index]).and_then(parse_block_title) else {
            index += 1;
            continue;
        };

        let header_index = (index + 1..rows.len())
            .find(|&i| first_text(rows[i]) == Some(CONTRACT_HEADER))
            .ok_or_else(|| AuditError::ColumnNotFound {
                column: CONTRACT_HEADER.to_string(),
            })?;
        let dates = header_dates(rows[header_index])?;
        let values = rows.get(header_index + 1).copied().unwrap_or(&[]);

        for (col, date) in dates.iter().enumerate() {
            let Some(cell) = values.get(col + 1) else {
                continue;
            };
            if matches!(cell, Data::Empty) {
                continue;
            }
            let fee = coerce_fee(cell).ok_or_else(|| AuditError::InvalidFeeValue {
                row: header_index + 2,
                value: cell.to_string(),
            })?;
            table.add(run.clone(), *date, fee)?;
        }

        index = header_index + 2;
    }

    Ok(table)
}

fn first_text(row: &[Data]) -> Option<&str> {
    match row.first() {
        Some(Data::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Dates after the `Contract Name` cell; trailing empty cells are padding
fn header_dates(row: &[Data]) -> Result<Vec<NaiveDate>, AuditError> {
    row.iter()
        .skip(1)
        .take_while(|cell| !matches!(cell, Data::Empty))
        .map(|cell| {
            let text = cell.to_string();
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| AuditError::DateNotFound { path: text })
        })
        .collect()
}
