//! Workbook access
//!
//! Each call opens the workbook, copies the requested sheet into memory and
//! drops the handle before returning, so only one input file is open at a
//! time.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use feeaudit_core::{AuditError, REPORT_SHEET};
use tracing::debug;

use crate::extract::{extract_records, Extraction};

/// Load the sheet called `sheet` from the workbook at `path`
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Range<Data>, AuditError> {
    let unreadable = |reason: String| AuditError::UnreadableFile {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(format!("Failed to open workbook: {e}")))?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name.as_str() == sheet) {
        debug!(path = %path.display(), available = ?sheet_names, "sheet {sheet:?} missing");
        return Err(AuditError::SheetNotFound {
            sheet: sheet.to_string(),
        });
    }

    workbook
        .worksheet_range(sheet)
        .map_err(|e| unreadable(format!("Failed to read sheet '{sheet}': {e}")))
}

/// Read the run/fee pairs of one STE report
pub fn read_report(path: &Path) -> Result<Extraction, AuditError> {
    let range = read_sheet(path, REPORT_SHEET)?;
    let extraction = extract_records(&range)?;
    debug!(
        path = %path.display(),
        rows = extraction.entries.len(),
        invalid = extraction.invalid_rows.len(),
        blank = extraction.blank_rows,
        "extracted report"
    );
    Ok(extraction)
}
