//! Plain-text run summary
//!
//! ```text
//! Run         Dates             Total
//! 20              1           340.697
//! 32              2           437.399
//! ---------------------------------
//! Total           2           778.096
//! ```

use feeaudit_core::{AggregateTable, RenderError, Renderer};

/// Text summary renderer: one line per run with its date count and total
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Width of the run label column
    pub label_width: usize,
    /// Whether to append a grand total line
    pub show_total: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            label_width: 10,
            show_total: true,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit the grand total line
    pub fn no_total(mut self) -> Self {
        self.show_total = false;
        self
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, table: &AggregateTable) -> Result<String, RenderError> {
        let width = table
            .runs()
            .map(|entry| entry.run.label().chars().count())
            .max()
            .unwrap_or(0)
            .max(self.label_width);

        let mut out = String::new();
        out.push_str(&format!("{:<width$} {:>6} {:>16}\n", "Run", "Dates", "Total"));
        for entry in table.runs() {
            out.push_str(&format!(
                "{:<width$} {:>6} {:>16}\n",
                entry.run.label(),
                entry.fees.len(),
                entry.total().normalize().to_string()
            ));
        }

        if self.show_total {
            out.push_str(&"-".repeat(width + 24));
            out.push('\n');
            out.push_str(&format!(
                "{:<width$} {:>6} {:>16}\n",
                "Total",
                table.dates().len(),
                table.grand_total().normalize().to_string()
            ));
        }

        Ok(out)
    }
}
