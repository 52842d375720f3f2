//! Excel audit workbook renderer
//!
//! Writes the [`AuditLayout`] of an aggregate table into a single worksheet.
//! Fees are written as plain numbers with the General format so Excel shows
//! them at the precision they were summed with.

use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use feeaudit_core::{AggregateTable, RenderError, Renderer, AUDIT_SHEET, DEFAULT_CONTRACT};

use crate::layout::{AuditLayout, LayoutCell};

/// Excel audit workbook renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Label written in the first cell of every data row
    pub contract_name: String,
    /// Name of the output worksheet
    pub sheet_name: String,
    /// Width of the label column
    pub label_width: f64,
    /// Width of each date column
    pub date_width: f64,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            contract_name: DEFAULT_CONTRACT.into(),
            sheet_name: AUDIT_SHEET.into(),
            label_width: 16.0,
            date_width: 12.0,
        }
    }
}

/// Reusable cell formats
struct ExcelFormats {
    title: Format,
    header: Format,
    label: Format,
    fee: Format,
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the contract label
    pub fn contract_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = name.into();
        self
    }

    /// Set the worksheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, table: &AggregateTable) -> Result<Vec<u8>, RenderError> {
        let layout = AuditLayout::build(table, &self.contract_name);
        let formats = Self::create_formats();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.sheet_name)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        self.write_layout(sheet, &layout, &formats)?;

        debug!(runs = table.len(), rows = layout.rows.len(), columns = layout.width, "rendered audit sheet");

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Render and write the workbook to `path`
    pub fn render_to_file(&self, table: &AggregateTable, path: &Path) -> Result<(), RenderError> {
        let bytes = self.render_to_bytes(table)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn create_formats() -> ExcelFormats {
        let title = Format::new().set_bold().set_font_size(12);

        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let label = Format::new().set_border(FormatBorder::Thin);

        let fee = Format::new().set_border(FormatBorder::Thin);

        ExcelFormats {
            title,
            header,
            label,
            fee,
        }
    }

    fn write_layout(
        &self,
        sheet: &mut Worksheet,
        layout: &AuditLayout,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet.set_column_width(0, self.label_width).ok();
        for col in 1..layout.width {
            sheet.set_column_width(col as u16, self.date_width).ok();
        }

        for (row, cells) in layout.rows.iter().enumerate() {
            let row = row as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    LayoutCell::Blank => {
                        sheet
                            .write_blank(row, col, &formats.fee)
                            .map_err(|e| RenderError::Format(e.to_string()))?;
                    }
                    LayoutCell::Title(text) => {
                        sheet
                            .write_string_with_format(row, col, text, &formats.title)
                            .map_err(|e| RenderError::Format(e.to_string()))?;
                    }
                    LayoutCell::Header(text) => {
                        sheet
                            .write_string_with_format(row, col, text, &formats.header)
                            .map_err(|e| RenderError::Format(e.to_string()))?;
                    }
                    LayoutCell::Label(text) => {
                        sheet
                            .write_string_with_format(row, col, text, &formats.label)
                            .map_err(|e| RenderError::Format(e.to_string()))?;
                    }
                    LayoutCell::Fee(fee) => {
                        let value = fee
                            .to_f64()
                            .ok_or_else(|| RenderError::InvalidData(format!("Fee out of range: {fee}")))?;
                        sheet
                            .write_number_with_format(row, col, value, &formats.fee)
                            .map_err(|e| RenderError::Format(e.to_string()))?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, table: &AggregateTable) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(table)
    }
}
