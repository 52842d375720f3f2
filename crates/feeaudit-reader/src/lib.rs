//! # feeaudit-reader
//!
//! Workbook input for feeaudit.
//!
//! - [`extract`]: turns the `All Data` sheet of an STE report into run/fee
//!   pairs, normalizing mixed cell types at the boundary
//! - [`workbook`]: opens workbooks and loads a named sheet
//! - [`audit`]: parses a rendered audit workbook back into an
//!   `AggregateTable`
//!
//! ## Example
//!
//! ```rust,ignore
//! use feeaudit_reader::read_report;
//!
//! let extraction = read_report(Path::new("STE_Report_20-06-2025.xlsx"))?;
//! let records = extraction.into_records(date, path);
//! ```

pub mod audit;
pub mod extract;
pub mod workbook;

pub use audit::{parse_audit_blocks, read_audit};
pub use extract::{extract_records, Extraction, InvalidFee, RunFee};
pub use workbook::{read_report, read_sheet};
