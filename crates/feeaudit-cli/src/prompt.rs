//! Interactive date range selection

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use feeaudit_core::DateRange;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ask the operator whether to process all files or a date range
///
/// An unknown choice, an unparsable date or an inverted range falls back to
/// processing all files.
pub fn prompt_date_range<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<DateRange> {
    writeln!(output, "Select processing mode:")?;
    writeln!(output, "1. Process all files")?;
    writeln!(output, "2. Specify date range")?;
    let choice = ask(input, output, "Enter choice (1 or 2): ")?;

    match choice.as_str() {
        "1" => Ok(DateRange::unbounded()),
        "2" => {
            let start = ask(input, output, "Start date (YYYY-MM-DD, empty for none): ")?;
            let end = ask(input, output, "End date (YYYY-MM-DD, empty for none): ")?;
            Ok(parse_range(&start, &end).unwrap_or_else(|reason| {
                warn!("{reason}; processing all files");
                writeln!(output, "{reason}. Processing all files.").ok();
                DateRange::unbounded()
            }))
        }
        other => {
            warn!(choice = other, "invalid choice; processing all files");
            writeln!(output, "Invalid choice. Processing all files.")?;
            Ok(DateRange::unbounded())
        }
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_range(start: &str, end: &str) -> Result<DateRange, String> {
    let start = parse_bound(start)?;
    let end = parse_bound(end)?;
    DateRange::new(start, end).map_err(|e| e.to_string())
}

fn parse_bound(text: &str) -> Result<Option<NaiveDate>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("Invalid date '{text}', expected YYYY-MM-DD"))
}
