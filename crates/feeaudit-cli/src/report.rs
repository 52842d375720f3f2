//! Run summary output
//!
//! After a successful run the CLI prints what was scanned, what was skipped
//! and the per-run totals, either as text or as a JSON document.
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: audit workbook written (skipped files allowed) |
//! | 1 | Failure: no files, no data, missing root, bad config or write error |

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use feeaudit_core::{AggregateTable, DateRange, Renderer, RunId};
use feeaudit_pipeline::{AuditConfig, AuditOutcome, DroppedRow, ProcessedFile, RunSummary, SkippedFile};
use feeaudit_render::TextRenderer;
use rust_decimal::Decimal;
use serde::Serialize;

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Audit workbook written
    Success = 0,
    /// Nothing was written
    Failure = 1,
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Summary output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
}

/// Everything the CLI reports about one run
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub root: &'a Path,
    pub range: DateRange,
    pub output: &'a Path,
    pub discovered: usize,
    pub candidates: usize,
    pub processed: &'a [ProcessedFile],
    pub out_of_range: &'a [PathBuf],
    pub skipped: &'a [SkippedFile],
    pub dropped_rows: &'a [DroppedRow],
    pub runs: Vec<RunSummary>,
    pub collisions: Vec<Vec<RunId>>,
    pub grand_total: Decimal,
    #[serde(skip)]
    table: &'a AggregateTable,
}

impl<'a> Summary<'a> {
    pub fn new(config: &'a AuditConfig, outcome: &'a AuditOutcome) -> Self {
        Self {
            root: &config.root_dir,
            range: config.range,
            output: &config.output,
            discovered: outcome.discovered,
            candidates: outcome.candidates(),
            processed: &outcome.processed,
            out_of_range: &outcome.out_of_range,
            skipped: &outcome.skipped,
            dropped_rows: &outcome.dropped_rows,
            runs: outcome.run_summaries(),
            collisions: outcome.table.numeric_collisions(),
            grand_total: outcome.table.grand_total(),
            table: &outcome.table,
        }
    }

    pub fn write<W: Write>(&self, format: SummaryFormat, out: &mut W) -> io::Result<()> {
        match format {
            SummaryFormat::Text => self.write_text(out),
            SummaryFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)
            }
        }
    }

    fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Root:           {}", self.root.display())?;
        writeln!(out, "Date range:     {}", self.range)?;
        writeln!(out, "Files found:    {}", self.discovered)?;
        writeln!(out, "Processed:      {}", self.processed.len())?;
        writeln!(out, "Outside range:  {}", self.out_of_range.len())?;
        writeln!(out, "Skipped:        {}", self.skipped.len())?;
        for skipped in self.skipped {
            writeln!(out, "  {} [{}] {}", skipped.path.display(), skipped.kind, skipped.reason)?;
        }

        if !self.dropped_rows.is_empty() {
            writeln!(out, "Invalid rows:   {}", self.dropped_rows.len())?;
            for row in self.dropped_rows {
                writeln!(out, "  {} row {} [{}]: {:?}", row.path.display(), row.row, row.kind, row.value)?;
            }
        }

        writeln!(out)?;
        let pivot = TextRenderer::new()
            .render(self.table)
            .map_err(|e| io::Error::other(e.to_string()))?;
        out.write_all(pivot.as_bytes())?;

        for group in &self.collisions {
            let labels: Vec<&str> = group.iter().map(RunId::label).collect();
            writeln!(out, "warning: runs {} differ only by leading zeros", labels.join(", "))?;
        }

        writeln!(out)?;
        writeln!(out, "Output:         {}", self.output.display())
    }
}
