//! feeaudit CLI - Agent Fee Audit Aggregator
//!
//! Scans a tree of STE report workbooks, sums each Run's agent fees per date
//! and writes the audit workbook.

mod prompt;
mod report;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use feeaudit_pipeline::{AuditConfig, AuditPipeline, ConfigLayer};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::prompt::prompt_date_range;
use crate::report::{ExitCode, Summary, SummaryFormat};

#[derive(Parser)]
#[command(name = "feeaudit")]
#[command(author, version, about = "Agent fee audit aggregator", long_about = None)]
struct Cli {
    /// Root directory holding the report tree
    #[arg(long, env = "FEEAUDIT_ROOT_DIR", value_name = "DIR")]
    root_dir: Option<PathBuf>,

    /// Output workbook [default: Agent_Fee_Audit.xlsx]
    #[arg(short, long, env = "FEEAUDIT_OUTPUT", value_name = "FILE")]
    output: Option<PathBuf>,

    /// First report date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    start_date: Option<NaiveDate>,

    /// Last report date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    end_date: Option<NaiveDate>,

    /// Ask for the date range on stdin (prompts go to stderr)
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    interactive: bool,

    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Summary format
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    format: SummaryFormat,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            root_dir: self.root_dir.clone(),
            output: self.output.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            ..ConfigLayer::default()
        }
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::Failure.into()
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut layer = cli.layer();
    if let Some(path) = &cli.config {
        layer = layer.or(ConfigLayer::load(path)?);
    }

    if cli.interactive {
        let range = prompt_date_range(&mut io::stdin().lock(), &mut io::stderr())
            .context("Failed to read date range")?;
        layer.start_date = range.start;
        layer.end_date = range.end;
    }

    let config = AuditConfig::from_layer(layer)?;
    debug!(?config, "resolved configuration");

    let outcome = AuditPipeline::new(config.clone())
        .run()
        .with_context(|| format!("Audit of {} failed", config.root_dir.display()))?;

    Summary::new(&config, &outcome)
        .write(cli.format, &mut io::stdout().lock())
        .context("Failed to print summary")?;
    Ok(())
}
