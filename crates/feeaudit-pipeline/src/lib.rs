//! # feeaudit-pipeline
//!
//! Drives an audit run: discovers STE report workbooks, filters them by the
//! date derived from their path, aggregates their fees and writes the audit
//! workbook.
//!
//! ## Example
//!
//! ```rust,no_run
//! use feeaudit_pipeline::{AuditConfig, AuditPipeline};
//!
//! let config = AuditConfig::new("/srv/reports").output("Agent_Fee_Audit.xlsx");
//! let outcome = AuditPipeline::new(config).run()?;
//! println!("{} runs, {} files skipped", outcome.table.len(), outcome.skipped.len());
//! # Ok::<(), feeaudit_pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod pipeline;
pub mod scan;

pub use config::{AuditConfig, ConfigError, ConfigLayer, DEFAULT_NAME_PATTERN, DEFAULT_OUTPUT};
pub use pipeline::{
    AuditOutcome, AuditPipeline, DroppedRow, PipelineError, ProcessedFile, RunSummary, SkippedFile,
};
pub use scan::find_report_files;
