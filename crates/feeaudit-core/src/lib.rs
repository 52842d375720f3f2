//! # feeaudit-core
//!
//! Core domain model for the feeaudit agent fee aggregator.
//!
//! This crate provides:
//! - Domain types: `RunId`, `FeeRecord`, `DateRange`
//! - Path date resolution: [`path_date::resolve_path_date`]
//! - Fee aggregation: [`AggregateTable`]
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use feeaudit_core::{AggregateTable, FeeRecord, RunId};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
//! let mut table = AggregateTable::new();
//! table.ingest([
//!     FeeRecord::new(RunId::new("20"), Decimal::new(1000, 1), date),
//!     FeeRecord::new(RunId::new("20 "), Decimal::new(240_697, 3), date),
//! ]);
//!
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.get(&RunId::new("20"), date), Some(Decimal::new(340_697, 3)));
//! ```

pub mod aggregate;
pub mod path_date;

pub use aggregate::{AggregateTable, RunEntry};
pub use path_date::{resolve_path_date, DatePattern, ResolvedDate};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Workbook Layout
// ============================================================================

/// Worksheet every input report must contain
pub const REPORT_SHEET: &str = "All Data";

/// Header of the run column in [`REPORT_SHEET`]
pub const RUN_COLUMN: &str = "Run";

/// Header of the fee column in [`REPORT_SHEET`]
pub const FEE_COLUMN: &str = "Agent Fee";

/// Worksheet holding the rendered audit blocks
pub const AUDIT_SHEET: &str = "Audit";

/// First cell of each block's date header row
pub const CONTRACT_HEADER: &str = "Contract Name";

/// Contract label written in each block's data row
pub const DEFAULT_CONTRACT: &str = "STE";

/// Title of the audit block for `run`
pub fn block_title(run: &RunId) -> String {
    format!("Run {} Audit", run.label())
}

/// Inverse of [`block_title`]
pub fn parse_block_title(title: &str) -> Option<RunId> {
    let label = title.trim().strip_prefix("Run ")?.strip_suffix(" Audit")?;
    let run = RunId::new(label);
    (!run.is_empty()).then_some(run)
}

// ============================================================================
// Run Identifier
// ============================================================================

/// Normalized identifier of a "Run"
///
/// Surrounding whitespace is trimmed and inner whitespace runs collapse to a
/// single space. Equality and hashing ignore case; the label keeps the
/// spelling it was created with.
#[derive(Clone, Debug)]
pub struct RunId {
    label: String,
    key: String,
}

impl RunId {
    pub fn new(raw: &str) -> Self {
        let label = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let key = label.to_uppercase();
        Self { label, key }
    }

    /// Display label, e.g. `20`
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Integer value of a purely numeric label with leading zeros removed
    ///
    /// `"020"` and `"20"` both give `Some("20")`; `"20A"` gives `None`.
    pub fn numeric_key(&self) -> Option<&str> {
        if self.label.is_empty() || !self.label.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = self.label.trim_start_matches('0');
        Some(if trimmed.is_empty() { "0" } else { trimmed })
    }
}

impl PartialEq for RunId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for RunId {}

impl Hash for RunId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl From<&str> for RunId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for RunId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

// ============================================================================
// Records
// ============================================================================

/// One fee row attributed to a run and a calendar date
#[derive(Clone, Debug, PartialEq)]
pub struct FeeRecord {
    pub run: RunId,
    pub fee: Decimal,
    pub date: NaiveDate,
    /// Workbook the row was read from, if any
    pub source: Option<PathBuf>,
    /// 1-based sheet row, if any
    pub row: Option<usize>,
}

impl FeeRecord {
    pub fn new(run: RunId, fee: Decimal, date: NaiveDate) -> Self {
        Self {
            run,
            fee,
            date,
            source: None,
            row: None,
        }
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

// ============================================================================
// Date Range
// ============================================================================

/// Inclusive date filter; either bound may be open
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Range that accepts every date
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, AuditError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AuditError::InvalidDateRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |d: Option<NaiveDate>| d.map_or_else(|| "*".to_string(), |d| d.to_string());
        write!(f, "{} .. {}", bound(self.start), bound(self.end))
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render an aggregate table to the output format
    fn render(&self, table: &AggregateTable) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Audit error
///
/// Per-file variants (`DateNotFound`, `SheetNotFound`, `ColumnNotFound`,
/// `UnreadableFile`) cause the file to be skipped. `InvalidFeeValue` and
/// `FeeOverflow` drop a single row. The remaining variants end the run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("No date found in path: {path}")]
    DateNotFound { path: String },

    #[error("Sheet '{sheet}' not found")]
    SheetNotFound { sheet: String },

    #[error("Column '{column}' not found in header row")]
    ColumnNotFound { column: String },

    #[error("Invalid fee value at row {row}: {value:?}")]
    InvalidFeeValue { row: usize, value: String },

    #[error("Unreadable file {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("No report files found under {}", root.display())]
    NoFilesFound { root: PathBuf },

    #[error("No fee data found in {files} candidate file(s)")]
    NoData { files: usize },

    #[error("Root directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Fee sum for run {run} on {date} overflows")]
    FeeOverflow { run: String, date: NaiveDate },
}

impl AuditError {
    /// Stable name of the error kind, used in summaries
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::DateNotFound { .. } => "DateNotFound",
            AuditError::SheetNotFound { .. } => "SheetNotFound",
            AuditError::ColumnNotFound { .. } => "ColumnNotFound",
            AuditError::InvalidFeeValue { .. } => "InvalidFeeValue",
            AuditError::UnreadableFile { .. } => "UnreadableFile",
            AuditError::NoFilesFound { .. } => "NoFilesFound",
            AuditError::NoData { .. } => "NoData",
            AuditError::RootNotFound(_) => "RootNotFound",
            AuditError::InvalidDateRange { .. } => "InvalidDateRange",
            AuditError::FeeOverflow { .. } => "FeeOverflow",
        }
    }

    /// Whether the error only affects the file being processed
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            AuditError::DateNotFound { .. }
                | AuditError::SheetNotFound { .. }
                | AuditError::ColumnNotFound { .. }
                | AuditError::UnreadableFile { .. }
        )
    }
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
