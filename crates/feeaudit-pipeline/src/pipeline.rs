//! Audit pipeline
//!
//! 1. Discover report files under the root directory
//! 2. Resolve each file's date from its path and apply the date range
//! 3. Extract run/fee rows from each remaining file, one workbook at a time
//! 4. Fold the rows of every fully read file into one [`AggregateTable`]
//! 5. Render the table to the output workbook
//!
//! Per-file failures skip the file and are listed in the outcome. Nothing
//! from a file reaches the table unless its extraction succeeded.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use feeaudit_core::{resolve_path_date, AggregateTable, AuditError, RenderError, RunId};
use feeaudit_reader::read_report;
use feeaudit_render::ExcelRenderer;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AuditConfig;
use crate::scan::find_report_files;

/// Pipeline error
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("Failed to write {}: {source}", path.display())]
    Render { path: PathBuf, source: RenderError },
}

/// A file that contributed to the table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessedFile {
    pub path: PathBuf,
    pub date: NaiveDate,
    /// Rows folded into the table
    pub rows: usize,
    pub blank_rows: usize,
}

/// A file left out because of a per-file error
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    /// Error kind, e.g. `SheetNotFound`
    pub kind: &'static str,
    pub reason: String,
}

/// A row dropped for an unreadable fee or a sum that overflows
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub path: PathBuf,
    pub row: usize,
    pub value: String,
    /// Error kind, e.g. `InvalidFeeValue`
    pub kind: &'static str,
}

/// Per-run line of the summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub run: RunId,
    pub dates: usize,
    pub total: Decimal,
}

/// Everything one audit run produced
#[derive(Clone, Debug, Default)]
pub struct AuditOutcome {
    pub table: AggregateTable,
    /// Files matching the name pattern
    pub discovered: usize,
    pub processed: Vec<ProcessedFile>,
    pub skipped: Vec<SkippedFile>,
    /// Files whose date lies outside the configured range
    pub out_of_range: Vec<PathBuf>,
    pub dropped_rows: Vec<DroppedRow>,
}

impl AuditOutcome {
    pub fn run_summaries(&self) -> Vec<RunSummary> {
        self.table
            .runs()
            .map(|entry| RunSummary {
                run: entry.run.clone(),
                dates: entry.fees.len(),
                total: entry.total(),
            })
            .collect()
    }

    /// Files that were read or skipped for an error
    pub fn candidates(&self) -> usize {
        self.processed.len() + self.skipped.len()
    }
}

/// Scans, aggregates and renders according to an [`AuditConfig`]
#[derive(Clone, Debug)]
pub struct AuditPipeline {
    config: AuditConfig,
}

impl AuditPipeline {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Build the aggregate table without writing anything
    ///
    /// Fails with `NoFilesFound` when no file passes the name and date
    /// filters, and with `NoData` when every candidate was skipped or empty.
    pub fn collect(&self) -> Result<AuditOutcome, AuditError> {
        let root = &self.config.root_dir;
        info!(root = %root.display(), range = %self.config.range, "scanning for reports");

        let files = find_report_files(root, &self.config.name_pattern)?;
        let mut outcome = AuditOutcome {
            discovered: files.len(),
            ..Default::default()
        };

        let mut dated = Vec::new();
        for path in files {
            match resolve_path_date(&path.to_string_lossy()) {
                Ok(resolved) if self.config.range.contains(resolved.date) => {
                    debug!(
                        path = %path.display(),
                        date = %resolved.date,
                        pattern = %resolved.pattern,
                        "resolved report date"
                    );
                    dated.push((path, resolved.date));
                }
                Ok(resolved) => {
                    debug!(path = %path.display(), date = %resolved.date, "outside date range");
                    outcome.out_of_range.push(path);
                }
                Err(err) => Self::skip(&mut outcome, path, &err),
            }
        }

        if dated.is_empty() && outcome.skipped.is_empty() {
            return Err(AuditError::NoFilesFound { root: root.clone() });
        }

        for (path, date) in dated {
            self.process_file(&mut outcome, path, date);
        }

        if outcome.table.is_empty() {
            return Err(AuditError::NoData {
                files: outcome.candidates(),
            });
        }

        for group in outcome.table.numeric_collisions() {
            let labels: Vec<&str> = group.iter().map(RunId::label).collect();
            warn!(runs = ?labels, "run labels differ only by leading zeros; kept separate");
        }

        info!(
            runs = outcome.table.len(),
            processed = outcome.processed.len(),
            skipped = outcome.skipped.len(),
            "aggregation complete"
        );
        Ok(outcome)
    }

    /// Collect and write the audit workbook to the configured output
    pub fn run(&self) -> Result<AuditOutcome, PipelineError> {
        let outcome = self.collect()?;
        self.write(&outcome.table, &self.config.output)?;
        Ok(outcome)
    }

    /// Render `table` to `path`
    pub fn write(&self, table: &AggregateTable, path: &Path) -> Result<(), PipelineError> {
        ExcelRenderer::new()
            .contract_name(&self.config.contract_name)
            .render_to_file(table, path)
            .map_err(|source| PipelineError::Render {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "audit report written");
        Ok(())
    }

    fn process_file(&self, outcome: &mut AuditOutcome, path: PathBuf, date: NaiveDate) {
        let extraction = match read_report(&path) {
            Ok(extraction) => extraction,
            Err(err) => {
                Self::skip(outcome, path, &err);
                return;
            }
        };

        outcome
            .dropped_rows
            .extend(extraction.invalid_rows.iter().map(|invalid| DroppedRow {
                path: path.clone(),
                row: invalid.row,
                value: invalid.value.clone(),
                kind: invalid.to_error().kind(),
            }));

        let rows = extraction.entries.len();
        let blank_rows = extraction.blank_rows;
        let rejected = outcome.table.ingest(extraction.into_records(date, &path));
        for record in &rejected {
            let err = AuditError::FeeOverflow {
                run: record.run.label().to_string(),
                date,
            };
            warn!(path = %path.display(), row = record.row, "dropping row: {err}");
            outcome.dropped_rows.push(DroppedRow {
                path: path.clone(),
                row: record.row.unwrap_or_default(),
                value: record.fee.to_string(),
                kind: err.kind(),
            });
        }

        outcome.processed.push(ProcessedFile {
            path,
            date,
            rows: rows - rejected.len(),
            blank_rows,
        });
    }

    fn skip(outcome: &mut AuditOutcome, path: PathBuf, err: &AuditError) {
        warn!(path = %path.display(), kind = err.kind(), "skipping file: {err}");
        outcome.skipped.push(SkippedFile {
            path,
            kind: err.kind(),
            reason: err.to_string(),
        });
    }
}
